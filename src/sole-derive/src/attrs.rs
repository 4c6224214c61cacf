use proc_macro::TokenStream;
use proc_macro2::Span;
use syn::{Error as SynError, Ident, Result as SynResult};

const DEFAULT_FACTORY_NAME: &str = "get_instance";

#[derive(Debug)]
pub struct AttributeData {
    pub factory: Ident,
}

pub fn parse_attributes(attr: TokenStream) -> SynResult<AttributeData> {
    if attr.is_empty() {
        return Ok(AttributeData {
            factory: Ident::new(DEFAULT_FACTORY_NAME, Span::call_site()),
        });
    }

    match syn::parse::<Ident>(attr) {
        Ok(factory) => Ok(AttributeData { factory }),
        Err(err) => Err(SynError::new(
            err.span(),
            "expects the name of the generated factory function, e.g. `#[singleton(instance)]`",
        )),
    }
}
