//! Property tests for the layout engine.

use proptest::prelude::*;

use infragram::{
    config::LayoutConfig,
    geometry::{Point, Size},
    layout::{Engine, Layout},
    schema::{Component, Container, Schema},
};

/// A Schema of `groups.len()` top-level Containers; group `i` holds
/// `groups[i].0` Components and, if `groups[i].1`, a nested Container with one
/// more Component.
fn build_schema(groups: &[(usize, bool)], loose: usize) -> Schema {
    let mut schema = Schema::new("generated");
    for (g, (count, nested)) in groups.iter().enumerate() {
        let mut container = Container::new(format!("group{g}").as_str(), format!("Group {g}"));
        for c in 0..*count {
            container = container.with_component(Component::new(
                format!("group{g}-c{c}").as_str(),
                "server",
                format!("C{c}"),
            ));
        }
        if *nested {
            container = container.with_container(
                Container::new(format!("group{g}-inner").as_str(), "Inner").with_component(
                    Component::new(format!("group{g}-inner-c").as_str(), "database", "DB"),
                ),
            );
        }
        schema = schema.with_container(container);
    }
    for l in 0..loose {
        schema = schema.with_component(Component::new(format!("loose{l}").as_str(), "user", "U"));
    }
    schema
}

fn position_strategy() -> impl Strategy<Value = Option<Point>> {
    prop::option::of((-500.0f32..1500.0, -500.0f32..1500.0).prop_map(|(x, y)| Point::new(x, y)))
}

/// A top-level Container with explicitly placed Components and a nested
/// Container, next to loose top-level Components.
fn build_positioned_schema(
    inner: &[Option<Point>],
    nested: Option<Point>,
    loose: &[Option<Point>],
) -> Schema {
    let place = |component: Component, position: Option<Point>| match position {
        Some(position) => component.with_position(position),
        None => component,
    };

    let mut nested_container =
        Container::new("nested", "Nested").with_component(Component::new("nested-c", "cache", "N"));
    if let Some(position) = nested {
        nested_container = nested_container.with_position(position);
    }
    let mut container = Container::new("outer", "Outer").with_container(nested_container);
    for (i, position) in inner.iter().enumerate() {
        container = container.with_component(place(
            Component::new(format!("inner{i}").as_str(), "server", "I"),
            *position,
        ));
    }

    let mut schema = Schema::new("positioned").with_container(container);
    for (i, position) in loose.iter().enumerate() {
        schema = schema.with_component(place(
            Component::new(format!("loose{i}").as_str(), "user", "U"),
            *position,
        ));
    }
    schema
}

fn assert_containers_cover_children(layout: &Layout, margin: f32) {
    for (id, placement) in layout.placements() {
        let Some(parent) = placement.parent() else {
            continue;
        };
        let parent = layout.get(parent).expect("Parent was placed");
        let child = placement.relative();
        let container = parent.relative().to_size();

        assert!(
            child.max_x() + margin <= container.width() + f32::EPSILON,
            "{id} overflows its container horizontally"
        );
        assert!(
            child.max_y() + margin <= container.height() + f32::EPSILON,
            "{id} overflows its container vertically"
        );
        assert!(parent.absolute().contains(&placement.absolute()));
    }
}

proptest! {
    #[test]
    fn containers_cover_children(
        groups in prop::collection::vec((0usize..6, any::<bool>()), 0..5),
        loose in 0usize..4,
        max_row_width in 200.0f32..1500.0,
    ) {
        let config = LayoutConfig::default().with_max_row_width(max_row_width);
        let margin = config.margin();
        let schema = build_schema(&groups, loose);
        let layout = Engine::new(config).calculate(&schema).unwrap();

        assert_containers_cover_children(&layout, margin);
        prop_assert!(layout.diagnostics().is_empty());
    }

    #[test]
    fn containers_cover_explicitly_placed_children(
        inner in prop::collection::vec(position_strategy(), 0..6),
        nested in position_strategy(),
        loose in prop::collection::vec(position_strategy(), 0..4),
    ) {
        let engine = Engine::default();
        let margin = LayoutConfig::default().margin();
        let schema = build_positioned_schema(&inner, nested, &loose);
        let layout = engine.calculate(&schema).unwrap();

        assert_containers_cover_children(&layout, margin);
        for (id, placement) in layout.placements() {
            let relative = placement.relative();
            prop_assert!(relative.min_x() >= margin, "{} starts left of the margin", id);
            prop_assert!(relative.min_y() >= margin, "{} starts above the margin", id);
        }

        let second = engine.calculate(&layout.apply(&schema)).unwrap();
        let first: Vec<_> = layout.placements().collect();
        let again: Vec<_> = second.placements().collect();
        prop_assert_eq!(first, again);
        prop_assert!(second.diagnostics().is_empty());
    }

    #[test]
    fn relayout_of_applied_schema_is_stable(
        groups in prop::collection::vec((0usize..5, any::<bool>()), 1..4),
        loose in 0usize..3,
    ) {
        let engine = Engine::default();
        let schema = build_schema(&groups, loose);
        let first = engine.calculate(&schema).unwrap();

        let explicit = first.apply(&schema);
        let second = engine.calculate(&explicit).unwrap();

        prop_assert_eq!(first, second);
    }
}

#[test]
fn test_explicit_geometry_is_kept() {
    let schema = Schema::new("explicit").with_container(
        Container::new("box", "Box")
            .with_position(Point::new(300.0, 400.0))
            .with_size(Size::new(900.0, 700.0))
            .with_component(Component::new("a", "server", "A")),
    );
    let layout = Engine::default().calculate(&schema).unwrap();
    let placement = layout.get("box".into()).unwrap();

    assert_eq!(placement.relative().min_point(), Point::new(300.0, 400.0));
    assert_eq!(placement.relative().to_size(), Size::new(900.0, 700.0));

    let applied = layout.apply(&schema);
    assert_eq!(applied.containers()[0].size(), Some(Size::new(900.0, 700.0)));
    assert_eq!(
        applied.containers()[0].components()[0].position(),
        Some(layout.get("a".into()).unwrap().relative().min_point())
    );
}

#[test]
fn test_negative_position_is_pulled_inside_container() {
    let schema = Schema::new("negative").with_container(
        Container::new("A", "A")
            .with_component(Component::new("x", "server", "X").with_position(Point::new(-100.0, -100.0))),
    );
    let layout = Engine::default().calculate(&schema).unwrap();

    let container = layout.get("A".into()).unwrap();
    let child = layout.get("x".into()).unwrap();
    assert!(container.absolute().contains(&child.absolute()));
    assert_eq!(container.relative().to_size(), Size::new(160.0, 130.0));
    assert_eq!(layout.diagnostics().len(), 1);
}

#[test]
fn test_degenerate_size_is_clamped_and_reported() {
    let schema = Schema::new("degenerate")
        .with_component(Component::new("flat", "server", "Flat").with_size(Size::new(0.0, -5.0)));
    let layout = Engine::default().calculate(&schema).unwrap();

    let size = layout.get("flat".into()).unwrap().relative().to_size();
    assert!(size.is_positive());
    assert_eq!(layout.diagnostics().len(), 1);
}
