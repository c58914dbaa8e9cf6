//! Layered derive implementation.

use proc_macro2::TokenStream;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Error, Fields, Result};

use crate::codegen::{generate_layered_impl, WalkedField};
use crate::parse::{
    parse_config_attrs, parse_config_rename_all, parse_serde_rename, parse_serde_rename_all,
    RenameRule,
};

/// Derive `Layered` (and `Field`) for a struct.
pub fn derive_layered(input: DeriveInput) -> Result<TokenStream> {
    // Only support structs
    let data = match &input.data {
        Data::Struct(data) => data,
        Data::Enum(_) => {
            return Err(Error::new_spanned(
                &input,
                "Layered can only be derived for structs, not enums",
            ));
        }
        Data::Union(_) => {
            return Err(Error::new_spanned(
                &input,
                "Layered can only be derived for structs, not unions",
            ));
        }
    };

    let rename_all = match parse_config_rename_all(&input.attrs)? {
        Some(rule) => Some(rule),
        None => parse_serde_rename_all(&input.attrs)?,
    };

    let fields = match &data.fields {
        Fields::Named(fields) => parse_named_fields(fields, rename_all)?,
        Fields::Unnamed(_) => {
            return Err(Error::new_spanned(
                &input,
                "Layered does not support tuple structs; use named fields",
            ));
        }
        Fields::Unit => Vec::new(),
    };

    Ok(generate_layered_impl(&input.ident, &input.generics, &fields))
}

/// Parse named struct fields and their attributes.
///
/// A field's file key is, in order of preference: `#[config(key)]`,
/// `#[serde(rename)]`, the container's `rename_all` rule, the field name.
fn parse_named_fields(
    fields: &syn::FieldsNamed,
    rename_all: Option<RenameRule>,
) -> Result<Vec<WalkedField>> {
    let mut result = Vec::new();

    for field in &fields.named {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| Error::new_spanned(field, "field must have a name"))?;

        let config = parse_config_attrs(&field.attrs)?;
        let name = ident.unraw().to_string();
        let key = match config.key {
            Some(key) => key,
            None => match parse_serde_rename(&field.attrs)? {
                Some(key) => key,
                None => rename_all.map_or_else(|| name.clone(), |rule| rule.apply(&name)),
            },
        };

        result.push(WalkedField {
            ident,
            ty: field.ty.clone(),
            name,
            key,
            default: config.default,
            env: config.env,
            skip: config.skip,
        });
    }

    Ok(result)
}
