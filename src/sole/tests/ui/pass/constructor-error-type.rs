use std::fmt;

use sole::prelude::*;

#[derive(Debug)]
pub struct Plain {
    ok: bool,
}

#[singleton]
impl Plain {
    #[constructor]
    pub fn new(ok: bool) -> Result<Self, String> {
        if ok {
            Ok(Self { ok })
        } else {
            Err(String::from("not ok"))
        }
    }
}

#[derive(Debug)]
pub struct Refusal;

impl fmt::Display for Refusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("refused")
    }
}

#[derive(Debug)]
pub struct Custom;

#[singleton]
impl Custom {
    #[constructor]
    pub fn new() -> Result<Self, Refusal> {
        Err(Refusal)
    }
}

fn main() {
    let registry = Registry::new();

    let err = Plain::get_instance(&registry, false).unwrap_err();
    assert_eq!(err.into_error().as_deref(), Some("not ok"));
    assert!(Plain::get_instance(&registry, true).unwrap().ok);

    let err = Custom::get_instance(&registry).unwrap_err();
    assert!(err.to_string().ends_with(": refused"));
}
