//! Attribute parsing for the Layered derive macro.
//!
//! This module handles `#[config(...)]` on fields and containers, plus the
//! parts of `#[serde(...)]` that decide which key a field is read from in a
//! file. Only `rename` and `rename_all` are read from serde; `alias` and
//! `flatten` have no effect on file keys.

use proc_macro2::TokenStream;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Expr, ExprLit, ExprUnary, Ident, Lit, LitStr, Result, Token, UnOp,
};

/// Parsed `#[config(...)]` settings for one field.
#[derive(Debug, Clone, Default)]
pub struct FieldConfig {
    /// Raw `default` annotation, already stringified.
    pub default: Option<String>,
    /// Environment variable name.
    pub env: Option<String>,
    /// File key override.
    pub key: Option<String>,
    /// Field is left alone by every pass.
    pub skip: bool,
}

/// A single item within `#[config(...)]`.
enum ConfigItem {
    Default(Ident, String),
    Env(Ident, String),
    Key(Ident, String),
    Skip(Ident),
}

/// Read a non-empty string value after `=`.
fn non_empty_str(input: ParseStream, what: &str) -> Result<String> {
    input.parse::<Token![=]>()?;
    let lit: LitStr = input.parse()?;
    let value = lit.value();
    if value.is_empty() {
        return Err(Error::new(lit.span(), format!("{} cannot be empty", what)));
    }
    Ok(value)
}

impl Parse for ConfigItem {
    fn parse(input: ParseStream) -> Result<Self> {
        let name: Ident = input.parse()?;
        let text = name.to_string();

        match text.as_str() {
            "default" => {
                input.parse::<Token![=]>()?;
                let expr: Expr = input.parse()?;
                let value = literal_to_string(&expr)?;
                Ok(ConfigItem::Default(name, value))
            }
            "env" => {
                let value = non_empty_str(input, "env variable name")?;
                Ok(ConfigItem::Env(name, value))
            }
            "key" => {
                let value = non_empty_str(input, "file key")?;
                Ok(ConfigItem::Key(name, value))
            }
            "skip" => {
                if input.peek(Token![=]) || input.peek(syn::token::Paren) {
                    return Err(Error::new(name.span(), "skip takes no arguments"));
                }
                Ok(ConfigItem::Skip(name))
            }

            // Suggestions for common typos
            "defualt" | "deafult" | "default_value" | "defaults" => Err(Error::new(
                name.span(),
                format!("unknown config key '{}'; did you mean 'default'?", text),
            )),
            "envvar" | "env_var" | "environment" | "var" => Err(Error::new(
                name.span(),
                format!("unknown config key '{}'; did you mean 'env'?", text),
            )),
            "skipped" | "ignore" => Err(Error::new(
                name.span(),
                format!("unknown config key '{}'; did you mean 'skip'?", text),
            )),
            "rename" | "name" | "file_key" => Err(Error::new(
                name.span(),
                format!("unknown config key '{}'; did you mean 'key'?", text),
            )),
            _ => Err(Error::new(
                name.span(),
                format!(
                    "unknown config key '{}'; expected one of 'default', 'env', 'key', 'skip'",
                    text
                ),
            )),
        }
    }
}

/// Stringify a `default` literal. Strings are taken verbatim, numbers and
/// booleans by their source text.
fn literal_to_string(expr: &Expr) -> Result<String> {
    match expr {
        Expr::Lit(ExprLit { lit, .. }) => match lit {
            Lit::Str(s) => Ok(s.value()),
            Lit::Int(i) => Ok(i.base10_digits().to_string()),
            Lit::Float(f) => Ok(f.base10_digits().to_string()),
            Lit::Bool(b) => Ok(b.value.to_string()),
            other => Err(Error::new(
                other.span(),
                "default must be a string, integer, float or bool literal",
            )),
        },
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_),
            expr: inner,
            ..
        }) => match inner.as_ref() {
            Expr::Lit(ExprLit {
                lit: Lit::Int(_) | Lit::Float(_),
                ..
            }) => Ok(format!("-{}", literal_to_string(inner)?)),
            _ => Err(Error::new(expr.span(), "expected numeric literal after '-'")),
        },
        _ => Err(Error::new(
            expr.span(),
            "default must be a string, integer, float or bool literal",
        )),
    }
}

/// Check if an attribute is `#[config(...)]`.
pub fn is_config_attr(attr: &Attribute) -> bool {
    attr.path().is_ident("config")
}

/// Check if an attribute is `#[serde(...)]`.
pub fn is_serde_attr(attr: &Attribute) -> bool {
    attr.path().is_ident("serde")
}

/// Parse every `#[config(...)]` attribute of a field into one `FieldConfig`.
pub fn parse_config_attrs(attrs: &[Attribute]) -> Result<FieldConfig> {
    let mut config = FieldConfig::default();

    for attr in attrs.iter().filter(|a| is_config_attr(a)) {
        let items = attr.parse_args_with(Punctuated::<ConfigItem, Token![,]>::parse_terminated)?;

        for item in items {
            match item {
                ConfigItem::Default(name, value) => {
                    if config.default.is_some() {
                        return Err(Error::new(name.span(), "duplicate 'default' key"));
                    }
                    config.default = Some(value);
                }
                ConfigItem::Env(name, value) => {
                    if config.env.is_some() {
                        return Err(Error::new(name.span(), "duplicate 'env' key"));
                    }
                    config.env = Some(value);
                }
                ConfigItem::Key(name, value) => {
                    if config.key.is_some() {
                        return Err(Error::new(name.span(), "duplicate 'key' key"));
                    }
                    config.key = Some(value);
                }
                ConfigItem::Skip(name) => {
                    if config.skip {
                        return Err(Error::new(name.span(), "duplicate 'skip' key"));
                    }
                    config.skip = true;
                }
            }
        }

        if config.skip
            && (config.default.is_some() || config.env.is_some() || config.key.is_some())
        {
            return Err(Error::new_spanned(
                attr,
                "skip cannot be combined with 'default', 'env' or 'key'",
            ));
        }
    }

    Ok(config)
}

/// Container-level `#[serde(rename_all = "...")]` rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameRule {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

impl RenameRule {
    const NAMES: &'static str = "lowercase, UPPERCASE, PascalCase, camelCase, snake_case, \
        SCREAMING_SNAKE_CASE, kebab-case, SCREAMING-KEBAB-CASE";

    fn from_name(rule: &str) -> Option<Self> {
        Some(match rule {
            "lowercase" => RenameRule::Lower,
            "UPPERCASE" => RenameRule::Upper,
            "PascalCase" => RenameRule::Pascal,
            "camelCase" => RenameRule::Camel,
            "snake_case" => RenameRule::Snake,
            "SCREAMING_SNAKE_CASE" => RenameRule::ScreamingSnake,
            "kebab-case" => RenameRule::Kebab,
            "SCREAMING-KEBAB-CASE" => RenameRule::ScreamingKebab,
            _ => return None,
        })
    }

    /// Apply the rule to a snake_case field name.
    pub fn apply(self, field: &str) -> String {
        match self {
            RenameRule::Lower | RenameRule::Snake => field.to_string(),
            RenameRule::Upper | RenameRule::ScreamingSnake => field.to_ascii_uppercase(),
            RenameRule::Kebab => field.replace('_', "-"),
            RenameRule::ScreamingKebab => field.replace('_', "-").to_ascii_uppercase(),
            RenameRule::Pascal | RenameRule::Camel => {
                let mut out = String::with_capacity(field.len());
                let mut upper = self == RenameRule::Pascal;
                for ch in field.chars() {
                    if ch == '_' {
                        upper = true;
                    } else if upper {
                        out.push(ch.to_ascii_uppercase());
                        upper = false;
                    } else {
                        out.push(ch);
                    }
                }
                out
            }
        }
    }
}

/// Parse container-level `#[config(rename_all = "...")]`.
pub fn parse_config_rename_all(attrs: &[Attribute]) -> Result<Option<RenameRule>> {
    let mut rule = None;

    for attr in attrs.iter().filter(|a| is_config_attr(a)) {
        attr.parse_nested_meta(|meta| {
            if !meta.path.is_ident("rename_all") {
                return Err(meta.error("unknown container config key; expected 'rename_all'"));
            }
            if rule.is_some() {
                return Err(meta.error("duplicate 'rename_all' key"));
            }
            let lit: LitStr = meta.value()?.parse()?;
            rule = Some(RenameRule::from_name(&lit.value()).ok_or_else(|| {
                Error::new(
                    lit.span(),
                    format!("unknown rename_all rule; expected one of {}", RenameRule::NAMES),
                )
            })?);
            Ok(())
        })?;
    }

    Ok(rule)
}

/// Find `rename_all` among container `#[serde(...)]` attributes.
///
/// Unknown rules are left for serde to report.
pub fn parse_serde_rename_all(attrs: &[Attribute]) -> Result<Option<RenameRule>> {
    let mut rule = None;

    for attr in attrs.iter().filter(|a| is_serde_attr(a)) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                if meta.input.peek(Token![=]) {
                    let lit: LitStr = meta.value()?.parse()?;
                    rule = RenameRule::from_name(&lit.value());
                } else {
                    meta.parse_nested_meta(|inner| {
                        let lit: LitStr = inner.value()?.parse()?;
                        if inner.path.is_ident("deserialize") {
                            rule = RenameRule::from_name(&lit.value());
                        }
                        Ok(())
                    })?;
                }
                Ok(())
            } else {
                skip_meta_value(meta.input)
            }
        })?;
    }

    Ok(rule)
}

/// Find a field-level `#[serde(rename = "...")]`, preferring the
/// deserialize name of `rename(deserialize = "...")`.
pub fn parse_serde_rename(attrs: &[Attribute]) -> Result<Option<String>> {
    let mut key = None;

    for attr in attrs.iter().filter(|a| is_serde_attr(a)) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                if meta.input.peek(Token![=]) {
                    let lit: LitStr = meta.value()?.parse()?;
                    key = Some(lit.value());
                } else {
                    meta.parse_nested_meta(|inner| {
                        let lit: LitStr = inner.value()?.parse()?;
                        if inner.path.is_ident("deserialize") {
                            key = Some(lit.value());
                        }
                        Ok(())
                    })?;
                }
                Ok(())
            } else {
                skip_meta_value(meta.input)
            }
        })?;
    }

    Ok(key)
}

/// Consume the value of a serde item we do not interpret.
fn skip_meta_value(input: ParseStream) -> Result<()> {
    if input.peek(Token![=]) {
        input.parse::<Token![=]>()?;
        input.parse::<Expr>()?;
    } else if input.peek(syn::token::Paren) {
        let content;
        syn::parenthesized!(content in input);
        content.parse::<TokenStream>()?;
    }
    Ok(())
}
