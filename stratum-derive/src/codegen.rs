//! Code generation for the Layered derive macro.
//!
//! For a struct this emits two impls: `Layered`, carrying the static field
//! annotations, and `Field`, whose passes visit every non-skipped field in
//! declaration order. Fields carrying `default` or `env` also get a const
//! assertion that their type can take them.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Generics, Ident, Type};

/// One named field of the deriving struct.
pub struct WalkedField {
    pub ident: Ident,
    pub ty: Type,
    /// Rust field name without any `r#` prefix.
    pub name: String,
    /// Key the field is read from in a file layer.
    pub key: String,
    pub default: Option<String>,
    pub env: Option<String>,
    pub skip: bool,
}

/// Generate the `Layered` and `Field` impls for a struct.
pub fn generate_layered_impl(
    struct_name: &Ident,
    generics: &Generics,
    fields: &[WalkedField],
) -> TokenStream {
    let walked: Vec<&WalkedField> = fields.iter().filter(|f| !f.skip).collect();

    let metas = walked.iter().map(|f| field_meta(f));

    let generic = !generics.params.is_empty();
    let mut generics = generics.clone();
    if generics.type_params().next().is_some() {
        let where_clause = generics.make_where_clause();
        for f in fields {
            let ty = &f.ty;
            if f.skip {
                where_clause
                    .predicates
                    .push(syn::parse_quote!(#ty: ::core::default::Default));
            } else {
                where_clause
                    .predicates
                    .push(syn::parse_quote!(#ty: ::stratum::field::Field));
            }
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let annotation_checks = generate_annotation_checks(&walked);
    let (item_checks, inline_checks) = if generic {
        (quote! {}, quote! { #(const { #annotation_checks };)* })
    } else {
        (quote! { #(const _: () = #annotation_checks;)* }, quote! {})
    };

    let zero_fields = fields.iter().map(|f| {
        let ident = &f.ident;
        if f.skip {
            quote! { #ident: ::core::default::Default::default() }
        } else {
            quote! { #ident: ::stratum::field::Field::zero() }
        }
    });

    let fill_defaults = walked.iter().enumerate().map(|(i, f)| {
        let ident = &f.ident;
        quote! {
            ::stratum::field::Field::fill_defaults(
                &mut self.#ident,
                &<Self as ::stratum::field::Layered>::FIELDS[#i],
            )?;
        }
    });

    let apply_env = walked.iter().enumerate().map(|(i, f)| {
        let ident = &f.ident;
        quote! {
            ::stratum::field::Field::apply_env(
                &mut self.#ident,
                &<Self as ::stratum::field::Layered>::FIELDS[#i],
                scope,
            )?;
        }
    });

    let merge_body = generate_merge_body(fields);
    let decode_body = generate_decode_body(&walked);

    quote! {
        #item_checks

        impl #impl_generics ::stratum::field::Layered for #struct_name #ty_generics #where_clause {
            const FIELDS: &'static [::stratum::field::FieldMeta] = &[
                #(#metas),*
            ];
        }

        impl #impl_generics ::stratum::field::Field for #struct_name #ty_generics #where_clause {
            const KIND: ::stratum::field::Kind = ::stratum::field::Kind::Struct;

            fn zero() -> Self {
                Self {
                    #(#zero_fields),*
                }
            }

            fn is_empty(&self) -> bool {
                false
            }

            fn fill_defaults(
                &mut self,
                meta: &::stratum::field::FieldMeta,
            ) -> ::core::result::Result<(), ::stratum::error::ConfigError> {
                #inline_checks
                ::stratum::field::nested(meta, || {
                    #(#fill_defaults)*
                    ::core::result::Result::Ok(())
                })
            }

            fn merge_from(&mut self, _meta: &::stratum::field::FieldMeta, layer: Self) {
                #merge_body
            }

            fn decode(
                &mut self,
                meta: &::stratum::field::FieldMeta,
                value: ::stratum::field::Value,
            ) -> ::core::result::Result<(), ::stratum::error::SourceErrorKind> {
                ::stratum::field::nested_key(meta, || {
                    #decode_body
                    ::core::result::Result::Ok(())
                })
            }

            fn apply_env(
                &mut self,
                meta: &::stratum::field::FieldMeta,
                scope: &::stratum::env::EnvScope<'_>,
            ) -> ::core::result::Result<(), ::stratum::error::ConfigError> {
                let _ = scope;
                ::stratum::field::nested(meta, || {
                    #(#apply_env)*
                    ::core::result::Result::Ok(())
                })
            }
        }
    }
}

/// Compile-time checks that `default`/`env` only sit on fields they can act
/// on.
fn generate_annotation_checks(walked: &[&WalkedField]) -> Vec<TokenStream> {
    walked
        .iter()
        .filter(|f| f.default.is_some() || f.env.is_some())
        .map(|f| {
            let ty = &f.ty;
            let message = format!(
                "field `{}`: `default` and `env` only apply to scalar fields and \
                 optional scalars, not to structs or collections",
                f.name
            );
            quote! {
                ::core::assert!(
                    <#ty as ::stratum::field::Field>::BASE_KIND.takes_annotations(),
                    #message
                )
            }
        })
        .collect()
}

/// Look each walked field up in the document table by its file key.
fn generate_decode_body(walked: &[&WalkedField]) -> TokenStream {
    if walked.is_empty() {
        return quote! {
            let _ = ::stratum::field::into_table(value)?;
        };
    }

    let lookups = walked.iter().enumerate().map(|(i, f)| {
        let ident = &f.ident;
        quote! {
            if let ::core::option::Option::Some(entry) =
                table.remove(<Self as ::stratum::field::Layered>::FIELDS[#i].key)
            {
                ::stratum::field::Field::decode(
                    &mut self.#ident,
                    &<Self as ::stratum::field::Layered>::FIELDS[#i],
                    entry,
                )?;
            }
        }
    });

    quote! {
        let mut table = ::stratum::field::into_table(value)?;
        #(#lookups)*
    }
}

/// `FieldMeta` constructor expression for one field.
fn field_meta(field: &WalkedField) -> TokenStream {
    let name = &field.name;
    let key = &field.key;

    let default = field
        .default
        .as_ref()
        .map(|raw| quote! { .default_value(#raw) });
    let env = field.env.as_ref().map(|var| quote! { .env(#var) });

    quote! {
        ::stratum::field::FieldMeta::new(#name).key(#key) #default #env
    }
}

/// Destructure the layer and merge each walked field; skipped fields are
/// dropped.
fn generate_merge_body(fields: &[WalkedField]) -> TokenStream {
    if fields.is_empty() {
        return quote! { let _ = layer; };
    }

    let bindings = fields.iter().enumerate().map(|(i, f)| {
        let ident = &f.ident;
        if f.skip {
            quote! { #ident: _ }
        } else {
            let local = format_ident!("__layer_{}", i);
            quote! { #ident: #local }
        }
    });

    let merges = fields
        .iter()
        .enumerate()
        .filter(|(_, f)| !f.skip)
        .enumerate()
        .map(|(meta_index, (position, f))| {
            let ident = &f.ident;
            let local = format_ident!("__layer_{}", position);
            quote! {
                ::stratum::field::Field::merge_from(
                    &mut self.#ident,
                    &<Self as ::stratum::field::Layered>::FIELDS[#meta_index],
                    #local,
                );
            }
        });

    quote! {
        let Self { #(#bindings),* } = layer;
        #(#merges)*
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compact(tokens: TokenStream) -> String {
        tokens.to_string().replace(' ', "")
    }

    fn field(name: &str, ty: Type) -> WalkedField {
        WalkedField {
            ident: format_ident!("{}", name),
            ty,
            name: name.to_string(),
            key: name.to_string(),
            default: None,
            env: None,
            skip: false,
        }
    }

    #[test]
    fn test_field_meta_tokens() {
        let mut port = field("port", syn::parse_quote!(u16));
        port.key = "Port".to_string();
        port.default = Some("8080".to_string());
        port.env = Some("PORT".to_string());

        let tokens = compact(field_meta(&port));
        assert_eq!(
            tokens,
            r#"::stratum::field::FieldMeta::new("port").key("Port").default_value("8080").env("PORT")"#
        );
    }

    #[test]
    fn test_skipped_fields_are_not_walked() {
        let mut cache = field("cache", syn::parse_quote!(Handle));
        cache.skip = true;
        let fields = vec![field("host", syn::parse_quote!(String)), cache];

        let name = format_ident!("Config");
        let tokens = compact(generate_layered_impl(&name, &Generics::default(), &fields));

        assert!(tokens.contains("letSelf{host:__layer_0,cache:_}=layer;"));
        assert!(!tokens.contains("self.cache"));
        assert!(tokens.contains("self.host"));
        assert!(!tokens.contains("where"));
    }

    #[test]
    fn test_generic_structs_bound_walked_fields() {
        let fields = vec![field("inner", syn::parse_quote!(T))];
        let generics: Generics = syn::parse_quote!(<T: Default>);

        let name = format_ident!("Wrapper");
        let tokens = compact(generate_layered_impl(&name, &generics, &fields));
        assert!(tokens.contains("whereT:::stratum::field::Field"));
    }

    #[test]
    fn test_empty_struct_merge() {
        let name = format_ident!("Empty");
        let tokens = compact(generate_layered_impl(&name, &Generics::default(), &[]));
        assert!(tokens.contains("let_=layer;"));
    }

    #[test]
    fn test_zero_constructor_covers_every_field() {
        let mut cache = field("cache", syn::parse_quote!(Handle));
        cache.skip = true;
        let fields = vec![field("host", syn::parse_quote!(String)), cache];

        let name = format_ident!("Config");
        let tokens = compact(generate_layered_impl(&name, &Generics::default(), &fields));
        assert!(tokens.contains(
            "Self{host:::stratum::field::Field::zero(),cache:::core::default::Default::default()}"
        ));
    }

    #[test]
    fn test_decode_looks_up_file_keys() {
        let mut port = field("port", syn::parse_quote!(u16));
        port.key = "listen-port".to_string();

        let name = format_ident!("Config");
        let tokens = compact(generate_layered_impl(&name, &Generics::default(), &[port]));
        assert!(tokens.contains("letmuttable=::stratum::field::into_table(value)?;"));
        assert!(tokens.contains("table.remove(<Selfas::stratum::field::Layered>::FIELDS[0usize].key)"));
    }

    #[test]
    fn test_annotated_fields_get_kind_checks() {
        let mut level = field("level", syn::parse_quote!(String));
        level.env = Some("LEVEL".to_string());
        let fields = vec![level, field("server", syn::parse_quote!(Server))];

        let name = format_ident!("Config");
        let tokens = compact(generate_layered_impl(&name, &Generics::default(), &fields));
        assert_eq!(tokens.matches("BASE_KIND.takes_annotations()").count(), 1);
        assert!(tokens.starts_with("const_:()=::core::assert!(<Stringas::stratum::field::Field>"));

        let generics: Generics = syn::parse_quote!(<T>);
        let tokens = compact(generate_layered_impl(&name, &generics, &fields));
        assert!(tokens.contains("const{::core::assert!(<Stringas::stratum::field::Field>"));
        assert!(!tokens.starts_with("const_"));
    }
}
