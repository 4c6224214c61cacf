use std::convert::Infallible;

use sole::prelude::*;

pub struct Test1;

#[singleton]
impl Test1 {
    #[constructor]
    pub fn new() -> Self {
        Self
    }
}

pub struct Test2;

#[singleton]
impl Test2 {
    #[constructor]
    pub fn new() -> Test2 {
        Test2
    }
}

pub struct Test3;

#[singleton]
impl Test3 {
    #[constructor]
    pub fn new() -> Result<Self, Infallible> {
        Ok(Self)
    }
}

pub struct Test4;

#[singleton]
impl Test4 {
    #[constructor]
    pub fn new() -> Result<Test4, Infallible> {
        Ok(Test4)
    }
}

pub struct Test5;

#[singleton]
impl Test5 {
    #[constructor]
    pub fn new() -> std::result::Result<Test5, std::fmt::Error> {
        Ok(Test5)
    }
}

fn main() {
    let registry = Registry::new();
    let _ = Test1::get_instance(&registry);
    let _ = Test2::get_instance(&registry);
    let _ = Test3::get_instance(&registry);
    let _ = Test4::get_instance(&registry);
    let _: Result<_, RegistryError<std::fmt::Error>> = Test5::get_instance(&registry);
}
