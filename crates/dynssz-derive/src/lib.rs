// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

extern crate proc_macro;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse_macro_input, parse_quote, Attribute, Data, DataEnum, DeriveInput, Fields, FieldsNamed,
    GenericParam, Generics, Lit, LitStr, Type,
};

/// Parsed `#[ssz(...)]` attribute of one field or variant.
#[derive(Default)]
struct FieldAttrs {
    ssz_type: Option<LitStr>,
    size: Option<LitStr>,
    bitsize: Option<LitStr>,
    dyn_size: Option<LitStr>,
    dyn_bitsize: Option<LitStr>,
    max: Option<LitStr>,
    dyn_max: Option<LitStr>,
    index: Option<LitStr>,
    omit: bool,
}

impl FieldAttrs {
    fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("ssz")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("omit") {
                    out.omit = true;
                    return Ok(());
                }
                let slot = if meta.path.is_ident("type") {
                    &mut out.ssz_type
                } else if meta.path.is_ident("size") {
                    &mut out.size
                } else if meta.path.is_ident("bitsize") {
                    &mut out.bitsize
                } else if meta.path.is_ident("dyn_size") {
                    &mut out.dyn_size
                } else if meta.path.is_ident("dyn_bitsize") {
                    &mut out.dyn_bitsize
                } else if meta.path.is_ident("max") {
                    &mut out.max
                } else if meta.path.is_ident("dyn_max") {
                    &mut out.dyn_max
                } else if meta.path.is_ident("index") {
                    &mut out.index
                } else {
                    return Err(meta.error("unknown ssz attribute"));
                };
                if slot.is_some() {
                    return Err(meta.error("duplicate ssz attribute"));
                }
                // Accept `size = "32"` as well as `size = 32`
                let lit: Lit = meta.value()?.parse()?;
                *slot = Some(match lit {
                    Lit::Str(s) => s,
                    Lit::Int(i) => LitStr::new(i.base10_digits(), i.span()),
                    other => {
                        return Err(syn::Error::new_spanned(
                            other,
                            "expected a string or integer literal",
                        ))
                    }
                });
                Ok(())
            })?;
        }
        Ok(out)
    }

    /// `RawHints { .. }` literal for the generated shape.
    fn to_tokens(&self) -> TokenStream2 {
        fn opt(v: &Option<LitStr>) -> TokenStream2 {
            match v {
                Some(s) => quote! { ::core::option::Option::Some(#s) },
                None => quote! { ::core::option::Option::None },
            }
        }
        let ssz_type = opt(&self.ssz_type);
        let size = opt(&self.size);
        let bitsize = opt(&self.bitsize);
        let dyn_size = opt(&self.dyn_size);
        let dyn_bitsize = opt(&self.dyn_bitsize);
        let max = opt(&self.max);
        let dyn_max = opt(&self.dyn_max);
        let index = opt(&self.index);
        let omit = self.omit;
        quote! {
            ::dynssz::types::RawHints {
                ssz_type: #ssz_type,
                size: #size,
                bitsize: #bitsize,
                dyn_size: #dyn_size,
                dyn_bitsize: #dyn_bitsize,
                max: #max,
                dyn_max: #dyn_max,
                index: #index,
                omit: #omit,
            }
        }
    }
}

/// `#[derive(Ssz)]` macro: generates an `SszType` impl
///
/// Supports:
/// - Structs with named fields: encoded as SSZ containers in declaration
///   order (progressive containers when fields carry `index`)
/// - Enums whose variants each hold one unnamed field: encoded as
///   compatible unions, the selector being the variant position
///
/// Field attributes (`#[ssz(...)]`):
/// - `type = "list"`: explicit SSZ kind (`bitlist`, `progressive-list`, ...)
/// - `size = "32"` / `bitsize = "512"`: vector length, `?` for a list level
/// - `max = "2048"`: list limit
/// - `dyn_size`, `dyn_bitsize`, `dyn_max`: spec expressions overriding the
///   literal when resolvable
/// - `index = "3"`: progressive container field index
/// - `omit`: skipped by the codec, restored with `Default::default()`
///
/// Example:
/// ```ignore
/// use dynssz::Ssz;
///
/// #[derive(Ssz, Default)]
/// struct Checkpoint {
///     epoch: u64,
///     #[ssz(size = "32")]
///     root: Vec<u8>,
/// }
/// ```
#[proc_macro_derive(Ssz, attributes(ssz))]
pub fn derive_ssz(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let expanded = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => expand_struct(&input, fields),
            _ => Err(syn::Error::new_spanned(
                &input,
                "Ssz derive supports only structs with named fields",
            )),
        },
        Data::Enum(data) => expand_enum(&input, data),
        Data::Union(_) => Err(syn::Error::new_spanned(
            &input,
            "Ssz derive does not support unions",
        )),
    };

    match expanded {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Every type parameter must itself be an `SszType`.
fn add_bounds(mut generics: Generics) -> Generics {
    for param in &mut generics.params {
        if let GenericParam::Type(ty) = param {
            ty.bounds.push(parse_quote!(::dynssz::SszType));
        }
    }
    generics
}

fn field_name(ident: &syn::Ident) -> String {
    let name = ident.to_string();
    name.strip_prefix("r#").map(str::to_string).unwrap_or(name)
}

fn expand_struct(input: &DeriveInput, fields: &FieldsNamed) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let type_name = name.to_string();
    let generics = add_bounds(input.generics.clone());
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    struct FieldInfo<'a> {
        ident: &'a syn::Ident,
        ty: &'a Type,
        attrs: FieldAttrs,
    }

    let mut infos = Vec::with_capacity(fields.named.len());
    for field in &fields.named {
        let Some(ident) = field.ident.as_ref() else {
            return Err(syn::Error::new_spanned(field, "unnamed field"));
        };
        infos.push(FieldInfo {
            ident,
            ty: &field.ty,
            attrs: FieldAttrs::parse(&field.attrs)?,
        });
    }

    let encoded: Vec<&FieldInfo> = infos.iter().filter(|f| !f.attrs.omit).collect();
    let count = encoded.len();

    // Omitted fields never reach the resolver, so their types need no SszType impl
    let shapes = encoded.iter().map(|f| {
        let fname = field_name(f.ident);
        let ty = f.ty;
        let hints = f.attrs.to_tokens();
        quote! {
            ::dynssz::types::FieldShape::new(
                #fname,
                ::dynssz::types::ShapeRef::of::<#ty>(),
                #hints,
            )
        }
    });

    let to_values = encoded.iter().map(|f| {
        let ident = f.ident;
        quote! { ::dynssz::SszType::to_ssz_value(&self.#ident) }
    });

    let inits = infos.iter().map(|f| {
        let ident = f.ident;
        let ty = f.ty;
        if f.attrs.omit {
            quote! { #ident: ::core::default::Default::default() }
        } else {
            let fname = field_name(ident);
            quote! {
                #ident: <#ty as ::dynssz::SszType>::from_ssz_value(
                    fields.next().ok_or_else(|| {
                        ::dynssz::error::DecodeError::InvalidData(
                            ::std::format!("{}: missing field {}", #type_name, #fname),
                        )
                    })?,
                )?
            }
        }
    });

    Ok(quote! {
        impl #impl_generics ::dynssz::SszType for #name #ty_generics #where_clause {
            fn shape() -> ::dynssz::types::SourceShape {
                ::dynssz::types::SourceShape::Struct(::dynssz::types::StructShape {
                    name: #type_name,
                    fields: ::std::vec![#(#shapes),*],
                })
            }

            fn to_ssz_value(&self) -> ::dynssz::SszValue {
                ::dynssz::SszValue::Container(::std::vec![#(#to_values),*])
            }

            fn from_ssz_value(
                value: ::dynssz::SszValue,
            ) -> ::core::result::Result<Self, ::dynssz::error::DecodeError> {
                let fields = match value {
                    ::dynssz::SszValue::Container(fields) => fields,
                    other => {
                        return ::core::result::Result::Err(
                            ::dynssz::error::DecodeError::TypeMismatch {
                                expected: "container",
                                found: other.kind_name(),
                            },
                        )
                    }
                };
                if fields.len() != #count {
                    return ::core::result::Result::Err(::dynssz::error::DecodeError::InvalidData(
                        ::std::format!(
                            "{} expects {} fields, got {}",
                            #type_name,
                            #count,
                            fields.len()
                        ),
                    ));
                }
                #[allow(unused_mut, unused_variables)]
                let mut fields = fields.into_iter();
                ::core::result::Result::Ok(Self { #(#inits),* })
            }
        }
    })
}

fn expand_enum(input: &DeriveInput, data: &DataEnum) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let type_name = name.to_string();
    let generics = add_bounds(input.generics.clone());
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    if data.variants.is_empty() {
        return Err(syn::Error::new_spanned(
            input,
            "Ssz union needs at least one variant",
        ));
    }
    if data.variants.len() > 256 {
        return Err(syn::Error::new_spanned(
            input,
            "Ssz union supports at most 256 variants",
        ));
    }

    let mut shapes = Vec::new();
    let mut to_arms = Vec::new();
    let mut from_arms = Vec::new();
    for (selector, variant) in data.variants.iter().enumerate() {
        let vident = &variant.ident;
        let ty = match &variant.fields {
            Fields::Unnamed(f) if f.unnamed.len() == 1 => &f.unnamed[0].ty,
            _ => {
                return Err(syn::Error::new_spanned(
                    variant,
                    "Ssz union variants must hold exactly one unnamed field",
                ))
            }
        };
        let attrs = FieldAttrs::parse(&variant.attrs)?;
        if attrs.omit || attrs.index.is_some() {
            return Err(syn::Error::new_spanned(
                variant,
                "omit and index do not apply to union variants",
            ));
        }
        let hints = attrs.to_tokens();
        let vname = vident.to_string();
        let selector = selector as u8;

        shapes.push(quote! {
            ::dynssz::types::FieldShape::new(
                #vname,
                ::dynssz::types::ShapeRef::of::<#ty>(),
                #hints,
            )
        });
        to_arms.push(quote! {
            Self::#vident(inner) => ::dynssz::SszValue::Union(
                #selector,
                ::std::boxed::Box::new(::dynssz::SszType::to_ssz_value(inner)),
            )
        });
        from_arms.push(quote! {
            #selector => ::core::result::Result::Ok(Self::#vident(
                <#ty as ::dynssz::SszType>::from_ssz_value(*inner)?,
            ))
        });
    }

    Ok(quote! {
        impl #impl_generics ::dynssz::SszType for #name #ty_generics #where_clause {
            fn shape() -> ::dynssz::types::SourceShape {
                ::dynssz::types::SourceShape::Enum(::dynssz::types::EnumShape {
                    name: #type_name,
                    variants: ::std::vec![#(#shapes),*],
                })
            }

            fn to_ssz_value(&self) -> ::dynssz::SszValue {
                match self {
                    #(#to_arms),*
                }
            }

            fn from_ssz_value(
                value: ::dynssz::SszValue,
            ) -> ::core::result::Result<Self, ::dynssz::error::DecodeError> {
                match value {
                    ::dynssz::SszValue::Union(selector, inner) => match selector {
                        #(#from_arms,)*
                        other => ::core::result::Result::Err(
                            ::dynssz::error::DecodeError::InvalidUnionVariant(other),
                        ),
                    },
                    other => ::core::result::Result::Err(
                        ::dynssz::error::DecodeError::TypeMismatch {
                            expected: "union",
                            found: other.kind_name(),
                        },
                    ),
                }
            }
        }
    })
}
