use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{quote, ToTokens};
use syn::spanned::Spanned;
use syn::visit_mut::{self, VisitMut};
use syn::{
    AngleBracketedGenericArguments, Attribute, Error as SynError, FnArg, GenericArgument, Ident,
    ImplItem, ImplItemFn, ItemImpl, PathArguments, Result as SynResult, ReturnType, Type,
    TypePath, Visibility,
};

use crate::attrs::AttributeData;

const RETURN_TYPE_MESSAGE: &str =
    "a constructor's return type should be `Self` or `Result<Self, E>`";

#[derive(Debug)]
struct ConstructorData {
    visibility: Visibility,
    identifier: Ident,
    arguments: Vec<ArgumentData>,
    return_type: ReturnTypeData,
}

#[derive(Debug)]
struct ArgumentData {
    identifier: Ident,
    ty: Type,
}

#[derive(Debug)]
enum ReturnTypeData {
    Infallible,
    Result { error_type: Type },
}

struct AttributeRemovalVisitor;

impl AttributeRemovalVisitor {
    fn is_custom_attribute(attr: &Attribute) -> bool {
        attr.path().is_ident("constructor")
    }
}

impl VisitMut for AttributeRemovalVisitor {
    fn visit_impl_item_fn_mut(&mut self, item: &mut ImplItemFn) {
        item.attrs.retain(|attr| !Self::is_custom_attribute(attr));
        visit_mut::visit_impl_item_fn_mut(self, item);
    }
}

pub fn expand_implementation(
    impls: TokenStream2,
    attr_data: AttributeData,
) -> SynResult<TokenStream2> {
    let mut impls = match syn::parse2::<ItemImpl>(impls) {
        Ok(impls) => impls,
        Err(err) => {
            return Err(SynError::new(
                err.span(),
                "`#[singleton]` should be annotated on the `impl` block",
            ))
        }
    };

    if let Some((_, path, _)) = &impls.trait_ {
        return Err(SynError::new(
            path.span(),
            "`#[singleton]` should be annotated on an inherent `impl` block",
        ));
    }

    let self_type = get_self_type(&impls)?;
    let constructor = get_constructor(&impls.items, impls.span())?;
    let ctor_data = parse_constructor(constructor, &self_type)?;

    let factory = expand_factory(ctor_data, attr_data)?;

    let mut visitor = AttributeRemovalVisitor;
    visitor.visit_item_impl_mut(&mut impls);
    impls.items.push(ImplItem::Fn(factory));

    Ok(impls.into_token_stream())
}

fn get_self_type(impls: &ItemImpl) -> SynResult<TypePath> {
    if let Type::Path(ty) = impls.self_ty.as_ref() {
        Ok(ty.clone())
    } else {
        Err(SynError::new(impls.self_ty.span(), "invalid self type"))
    }
}

fn get_constructor(items: &[ImplItem], impl_span: Span) -> SynResult<&ImplItemFn> {
    let ctors: Vec<_> = items
        .iter()
        .filter_map(filter_and_map_item_fn)
        .filter(is_annotated_with_constructor)
        .collect();

    let ctor = if ctors.len() > 1 {
        return Err(SynError::new(
            impl_span,
            "only one associated function can be annotated with `#[constructor]`",
        ));
    } else if let Some(&ctor) = ctors.first() {
        ctor
    } else {
        return Err(SynError::new(
            impl_span,
            "no associated function is annotated with `#[constructor]`",
        ));
    };

    if let Some(FnArg::Receiver(rec)) = ctor.sig.inputs.first() {
        return Err(SynError::new(
            rec.span(),
            "method is not allowed to be annotated with `#[constructor]`",
        ));
    }

    if !ctor.sig.generics.params.is_empty() {
        return Err(SynError::new(
            ctor.sig.generics.span(),
            "a constructor annotated with `#[constructor]` should not be generic",
        ));
    }

    if let Some(asyncness) = &ctor.sig.asyncness {
        return Err(SynError::new(
            asyncness.span(),
            "a constructor annotated with `#[constructor]` should not be `async`",
        ));
    }

    Ok(ctor)
}

fn filter_and_map_item_fn(item: &ImplItem) -> Option<&ImplItemFn> {
    if let ImplItem::Fn(impl_fn) = item {
        Some(impl_fn)
    } else {
        None
    }
}

fn is_annotated_with_constructor(item_fn: &&ImplItemFn) -> bool {
    item_fn
        .attrs
        .iter()
        .any(AttributeRemovalVisitor::is_custom_attribute)
}

fn parse_constructor(ctor: &ImplItemFn, self_type: &TypePath) -> SynResult<ConstructorData> {
    let arguments = ctor
        .sig
        .inputs
        .iter()
        .enumerate()
        .map(|(i, arg)| match arg {
            FnArg::Typed(arg) => ArgumentData {
                identifier: Ident::new(&format!("arg{i}"), arg.span()),
                ty: (*arg.ty).clone(),
            },
            FnArg::Receiver(_) => {
                unreachable!("a constructor should not have a receiver argument")
            }
        })
        .collect();
    let return_type = parse_constructor_return_type(&ctor.sig.output, self_type)?;

    Ok(ConstructorData {
        visibility: ctor.vis.clone(),
        identifier: ctor.sig.ident.clone(),
        arguments,
        return_type,
    })
}

fn parse_constructor_return_type(
    output: &ReturnType,
    self_type: &TypePath,
) -> SynResult<ReturnTypeData> {
    let ReturnType::Type(_, return_type) = output else {
        return Err(SynError::new(output.span(), RETURN_TYPE_MESSAGE));
    };
    let Type::Path(return_type) = return_type.as_ref() else {
        return Err(SynError::new(return_type.span(), RETURN_TYPE_MESSAGE));
    };

    if is_self_type(return_type, self_type) {
        return Ok(ReturnTypeData::Infallible);
    }

    let segments = &return_type.path.segments;
    let is_result = match segments.len() {
        1 => segments[0].ident == "Result",
        3 => {
            (segments[0].ident == "std" || segments[0].ident == "core")
                && segments[1].ident == "result"
                && segments[2].ident == "Result"
        }
        _ => false,
    };

    match segments.last() {
        Some(last) if is_result && return_type.qself.is_none() => {
            parse_result_return_type(&last.arguments, self_type)
        }
        _ => Err(SynError::new(return_type.span(), RETURN_TYPE_MESSAGE)),
    }
}

fn parse_result_return_type(
    type_args: &PathArguments,
    self_type: &TypePath,
) -> SynResult<ReturnTypeData> {
    let PathArguments::AngleBracketed(AngleBracketedGenericArguments {
        args: type_args, ..
    }) = type_args
    else {
        return Err(SynError::new(type_args.span(), RETURN_TYPE_MESSAGE));
    };

    if type_args.len() != 2 {
        return Err(SynError::new(type_args.span(), RETURN_TYPE_MESSAGE));
    }

    match (&type_args[0], &type_args[1]) {
        (GenericArgument::Type(Type::Path(ok_type)), GenericArgument::Type(error_type))
            if is_self_type(ok_type, self_type) =>
        {
            Ok(ReturnTypeData::Result {
                error_type: error_type.clone(),
            })
        }
        _ => Err(SynError::new(type_args.span(), RETURN_TYPE_MESSAGE)),
    }
}

fn is_self_type(ty: &TypePath, self_type: &TypePath) -> bool {
    ty == self_type || (ty.qself.is_none() && ty.path.is_ident("Self"))
}

fn expand_factory(ctor_data: ConstructorData, attr_data: AttributeData) -> SynResult<ImplItemFn> {
    let visibility = &ctor_data.visibility;
    let constructor = &ctor_data.identifier;
    let factory = &attr_data.factory;

    let error_type = match &ctor_data.return_type {
        ReturnTypeData::Infallible => quote! { ::std::convert::Infallible },
        ReturnTypeData::Result { error_type } => error_type.to_token_stream(),
    };

    let params = ctor_data
        .arguments
        .iter()
        .map(|ArgumentData { identifier, ty }| quote! { #identifier: #ty, })
        .collect::<TokenStream2>();

    let args = ctor_data
        .arguments
        .iter()
        .map(|ArgumentData { identifier, .. }| quote! { #identifier, })
        .collect::<TokenStream2>();

    let construct = if let ReturnTypeData::Infallible = &ctor_data.return_type {
        quote! { ::std::result::Result::<Self, #error_type>::Ok(Self::#constructor(#args)) }
    } else {
        quote! { Self::#constructor(#args) }
    };

    let doc = format!(
        "Returns the only instance of `Self` in `registry`, calling [`Self::{constructor}`] \
         with the given arguments if it doesn't exist yet."
    );

    syn::parse2(quote! {
        #[doc = #doc]
        #visibility fn #factory(
            registry: &::sole::registry::Registry,
            #params
        ) -> ::std::result::Result<
            ::std::sync::Arc<Self>,
            ::sole::registry::RegistryError<#error_type>
        > {
            registry.get_or_create(move || #construct)
        }
    })
}
