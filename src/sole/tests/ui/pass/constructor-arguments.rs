use std::sync::Arc;

use sole::prelude::*;

pub struct Point {
    x: i64,
    y: i64,
    label: String,
}

#[singleton(origin)]
impl Point {
    #[constructor]
    fn new((x, y): (i64, i64), mut label: String) -> Self {
        label.make_ascii_uppercase();
        Self { x, y, label }
    }

    fn label(&self) -> &str {
        &self.label
    }
}

fn main() {
    let registry = Registry::new();
    let point: Arc<Point> = Point::origin(&registry, (0, 0), String::from("o")).unwrap();
    assert_eq!((point.x, point.y), (0, 0));
    assert_eq!(point.label(), "O");
}
