use std::convert::Infallible;
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
    let x = MyTestClass::instance(&registry, "Initial value").unwrap();
    // Doesn't change the value of the first instance.
    let y = MyTestClass::instance(&registry, "Different value").unwrap();

    println!("x.valor: {}", x.valor);
    println!("y.valor: {}", y.valor);
    println!("Are x and y the same? {}", Arc::ptr_eq(&x, &y));
}

struct MyTestClass {
    valor: String,
}

impl Singleton for MyTestClass {
    type Args = &'static str;

    type Error = Infallible;

    fn construct(valor: Self::Args) -> Result<Self, Self::Error> {
        Ok(Self {
            valor: valor.to_owned(),
        })
    }
}
