//! Property tests for collision shapes and navigation plan splitting.

use proptest::prelude::*;

use sarathi::core::Point2D;
use sarathi::navigation::{NavPlan, NavStep};
use sarathi::shapes::{Circle, Shape};
use sarathi::world::Doorway;

fn point() -> impl Strategy<Value = Point2D> {
    (-500.0f32..500.0, -500.0f32..500.0).prop_map(|(x, y)| Point2D::new(x, y))
}

fn leaf_shape() -> impl Strategy<Value = Shape> {
    prop_oneof![
        (point(), 1.0f32..150.0).prop_map(|(c, r)| Shape::circle(c, r)),
        (point(), 1.0f32..300.0, 1.0f32..300.0, -3.1f32..3.1)
            .prop_map(|(c, w, h, q)| Shape::rectangle(c, (w, h), q)),
        (point(), point(), point()).prop_map(|(a, b, c)| Shape::polygon(vec![a, b, c])),
    ]
}

fn shape() -> impl Strategy<Value = Shape> {
    prop_oneof![
        3 => leaf_shape(),
        1 => prop::collection::vec(leaf_shape(), 0..4).prop_map(Shape::compound),
    ]
}

proptest! {
    #[test]
    fn collision_is_symmetric(a in shape(), b in shape()) {
        prop_assert_eq!(a.collides(&b), b.collides(&a));
    }

    #[test]
    fn circle_collision_is_exact(
        c1 in point(), r1 in 0.1f32..200.0,
        c2 in point(), r2 in 0.1f32..200.0,
    ) {
        let expected = c1.distance(&c2) < r1 + r2;
        prop_assert_eq!(Circle::new(c1, r1).collides_circle(&Circle::new(c2, r2)), expected);
        prop_assert_eq!(Shape::circle(c1, r1).collides(&Shape::circle(c2, r2)), expected);
    }

    #[test]
    fn compound_bounding_box_covers_members(members in prop::collection::vec(leaf_shape(), 1..5)) {
        let bb = Shape::compound(members.clone()).bounding_box();
        for m in &members {
            let mb = m.bounding_box();
            prop_assert!(bb.contains(mb.min) && bb.contains(mb.max));
        }
    }

    #[test]
    fn path_without_crossing_is_one_drive(
        ys in prop::collection::vec(-200.0f32..200.0, 0..20),
    ) {
        // Path stays left of x=1000; the doorway sits beyond it
        let path: Vec<Point2D> = ys
            .iter()
            .enumerate()
            .map(|(i, y)| Point2D::new(i as f32 * 40.0, *y))
            .collect();
        let doors = [Doorway::new("far", Point2D::new(1000.0, 0.0), 0.0, 300.0)];

        let plan = NavPlan::from_path(&path, &doors);
        prop_assert_eq!(plan.steps, vec![NavStep::Drive(path)]);
    }

    #[test]
    fn path_crossing_one_doorway_is_truncated(n in 2usize..30, seed in 0usize..1000) {
        let i = 1 + seed % (n - 1);
        let path: Vec<Point2D> = (0..n).map(|k| Point2D::new(k as f32 * 100.0, 0.0)).collect();
        // Doorway across the middle of segment path[i-1]-path[i]
        let x = (i as f32 - 0.5) * 100.0;
        let doors = [Doorway::new("door", Point2D::new(x, 0.0), 0.0, 50.0)];

        let plan = NavPlan::from_path(&path, &doors);
        prop_assert_eq!(plan.steps.len(), 2);
        prop_assert_eq!(&plan.steps[0], &NavStep::Drive(path[..i].to_vec()));
        prop_assert_eq!(&plan.steps[1], &NavStep::DoorwayPass("door".to_string()));
    }
}
