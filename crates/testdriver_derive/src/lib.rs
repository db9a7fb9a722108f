//! Derive macros for testdriver fixtures.
//!
//! - `ParamEnum`: lets a fieldless enum be used as a typed test parameter. The binder accepts a
//!   supplied value only when it exactly matches one of the variant names.

use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, parse_macro_input};

/// Implements `testdriver::ParamEnum` and `testdriver::Param` for a fieldless enum.
///
/// # Example
/// ```ignore
/// #[derive(ParamEnum)]
/// enum Currency {
///     Usd,
///     Eur,
/// }
///
/// // Generates (roughly):
/// impl ParamEnum for Currency {
///     const TYPE_NAME: &'static str = "Currency";
///     const MEMBERS: &'static [&'static str] = &["Usd", "Eur"];
///     fn from_member(name: &str) -> Option<Self> { ... }
///     fn member(&self) -> &'static str { ... }
/// }
/// ```
#[proc_macro_derive(ParamEnum)]
pub fn derive_param_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let name_str = name.to_string();

    let variants = match &input.data {
        Data::Enum(data) => &data.variants,
        _ => {
            return syn::Error::new_spanned(name, "ParamEnum can only be derived for enums")
                .to_compile_error()
                .into();
        }
    };

    if let Some(variant) = variants.iter().find(|v| !matches!(v.fields, Fields::Unit)) {
        return syn::Error::new_spanned(variant, "ParamEnum variants must not carry data")
            .to_compile_error()
            .into();
    }

    let idents: Vec<_> = variants.iter().map(|v| &v.ident).collect();
    let members: Vec<String> = idents.iter().map(|i| i.to_string()).collect();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::testdriver::ParamEnum for #name #ty_generics #where_clause {
            const TYPE_NAME: &'static str = #name_str;
            const MEMBERS: &'static [&'static str] = &[#(#members),*];

            fn from_member(name: &str) -> ::core::option::Option<Self> {
                match name {
                    #(#members => ::core::option::Option::Some(#name::#idents),)*
                    _ => ::core::option::Option::None,
                }
            }

            fn member(&self) -> &'static str {
                match self {
                    #(#name::#idents => #members,)*
                }
            }
        }

        impl #impl_generics ::testdriver::Param for #name #ty_generics #where_clause {
            fn param_type() -> ::testdriver::ParamType {
                ::testdriver::ParamType::of_enum::<Self>()
            }

            fn from_arg(arg: &::testdriver::ArgValue) -> ::core::option::Option<Self> {
                match arg {
                    ::testdriver::ArgValue::Enum { member, .. } => {
                        <Self as ::testdriver::ParamEnum>::from_member(member)
                    }
                    _ => ::core::option::Option::None,
                }
            }
        }
    };

    TokenStream::from(expanded)
}
