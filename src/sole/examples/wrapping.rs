use std::sync::Arc;

use sole::prelude::*;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let registry = Registry::new();
    let a = MySingleton::get_instance(&registry, 10).unwrap();
    // Doesn't change the value of the first instance.
    let b = MySingleton::get_instance(&registry, 20).unwrap();

    println!("{}", a.valor);
    println!("{}", b.valor);
    println!("{}", Arc::ptr_eq(&a, &b));
}

struct MySingleton {
    valor: i32,
}

#[singleton]
impl MySingleton {
    #[constructor]
    fn new(valor: i32) -> Self {
        Self { valor }
    }
}
