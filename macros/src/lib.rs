use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, LitStr, Type};

/// Defines a struct whose fields are loaded from environment variables.
///
/// Each field carries a `#[var(...)]` attribute naming the environment
/// variable, a description, and one of three modes:
///
/// - `required` with an `example = expr`
/// - `default = expr`
/// - `optional` with an `example = "str"` (field type must be `Option<T>`)
///
/// The macro emits the struct with every field wrapped in
/// `envcast::EnvField<T>` plus an `envcast::LoadEnv` implementation.
#[proc_macro]
pub fn define_env(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

struct VarSpec {
    env_key: String,
    doc: String,
    example: Option<syn::Expr>,
    mode: Mode,
}

enum Mode {
    Required,
    Default(syn::Expr),
    Optional,
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &input.ident;
    let vis = &input.vis;

    let docs_optional = has_allow_missing_docs(&input.attrs);

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "define_env! only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "define_env! only supports structs",
            ));
        }
    };

    let mut field_defs = Vec::new();
    let mut load_stmts = Vec::new();
    let mut field_inits = Vec::new();

    for field in fields {
        let name = field.ident.as_ref().unwrap();
        let field_vis = &field.vis;
        let field_type = &field.ty;

        let spec = parse_var_spec(field, docs_optional)?;

        // Pass #[cfg(...)] through so fields can be feature-gated
        let cfg_attrs: Vec<&Attribute> = field
            .attrs
            .iter()
            .filter(|attr| attr.path().is_ident("cfg"))
            .collect();

        field_defs.push(quote! {
            #(#cfg_attrs)*
            #field_vis #name: ::envcast::EnvField<#field_type>
        });

        let env_key = &spec.env_key;
        let doc = &spec.doc;

        let load_stmt = match &spec.mode {
            Mode::Required => {
                let example = spec.example.as_ref().ok_or_else(|| {
                    syn::Error::new_spanned(
                        field,
                        "required fields must have an example = ... attribute",
                    )
                })?;

                quote! {
                    #(#cfg_attrs)*
                    let #name = builder.required::<#field_type>(#env_key, #doc, #example);
                }
            }
            Mode::Default(default_expr) => {
                quote! {
                    #(#cfg_attrs)*
                    let #name = builder.or_default::<#field_type>(#env_key, #doc, #default_expr);
                }
            }
            Mode::Optional => {
                let example = spec.example.as_ref().ok_or_else(|| {
                    syn::Error::new_spanned(
                        field,
                        "optional fields must have an example = ... attribute",
                    )
                })?;

                let inner = option_inner_type(field_type).ok_or_else(|| {
                    syn::Error::new_spanned(
                        field,
                        "optional fields must have type Option<T>",
                    )
                })?;

                quote! {
                    #(#cfg_attrs)*
                    let #name = builder.optional::<#inner>(#env_key, #doc, #example);
                }
            }
        };

        load_stmts.push(load_stmt);

        // Safe to unwrap after finish(): every builder method returns Some
        // unless it pushed an error, and finish() already bailed on errors.
        field_inits.push(quote! {
            #(#cfg_attrs)*
            #name: #name.unwrap()
        });
    }

    // Keep user attributes on the struct, minus our allow(missing_docs) marker
    let kept_attrs: Vec<&Attribute> = input
        .attrs
        .iter()
        .filter(|attr| !is_allow_missing_docs(attr))
        .collect();

    let struct_def = quote! {
        #(#kept_attrs)*
        #vis struct #struct_name {
            #(#field_defs),*
        }
    };

    let load_impl = quote! {
        impl ::envcast::LoadEnv for #struct_name {
            fn load() -> Self {
                match <Self as ::envcast::LoadEnv>::load_or_error() {
                    Ok(loaded) => loaded,
                    Err(errors) => panic!("{}", ::envcast::format_env_errors(&errors)),
                }
            }

            fn load_or_error() -> Result<Self, Vec<::envcast::EnvError>> {
                let _ = dotenvy::dotenv();
                let mut builder = ::envcast::EnvBuilder::new();

                #(#load_stmts)*

                builder.finish()?;

                Ok(Self {
                    #(#field_inits),*
                })
            }

            #[allow(unused_variables)]
            fn builder_for_docs() -> ::envcast::EnvBuilder {
                let mut builder = ::envcast::EnvBuilder::new();

                #(#load_stmts)*

                builder
            }
        }
    };

    Ok(quote! {
        #struct_def
        #load_impl
    })
}

/// Parse the #[var(env = "X", doc = "Y", required | default = v | optional, example = e)]
/// attribute on one field.
fn parse_var_spec(field: &syn::Field, docs_optional: bool) -> syn::Result<VarSpec> {
    let attr = field
        .attrs
        .iter()
        .find(|attr| attr.path().is_ident("var"))
        .ok_or_else(|| {
            syn::Error::new_spanned(
                field,
                "field must have a #[var(...)] attribute with env, doc, and a mode \
                 (required, optional, or default = value)",
            )
        })?;

    let mut env_key: Option<String> = None;
    let mut doc: Option<String> = None;
    let mut example: Option<syn::Expr> = None;
    let mut default: Option<syn::Expr> = None;
    let mut required = false;
    let mut optional = false;

    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("env") {
            let lit: LitStr = meta.value()?.parse()?;
            env_key = Some(lit.value());
        } else if meta.path.is_ident("doc") {
            let lit: LitStr = meta.value()?.parse()?;
            doc = Some(lit.value().trim().to_string());
        } else if meta.path.is_ident("example") {
            example = Some(meta.value()?.parse()?);
        } else if meta.path.is_ident("default") {
            default = Some(meta.value()?.parse()?);
        } else if meta.path.is_ident("required") {
            required = true;
        } else if meta.path.is_ident("optional") {
            optional = true;
        } else {
            return Err(meta.error("unknown key in #[var(...)]"));
        }
        Ok(())
    })?;

    let env_key = env_key.ok_or_else(|| {
        syn::Error::new_spanned(attr, "field must have env = \"VAR_NAME\"")
    })?;

    let doc = match doc {
        Some(doc) => doc,
        None if docs_optional => String::new(),
        None => {
            return Err(syn::Error::new_spanned(
                attr,
                "field must have doc = \"description\" (or use #[allow(missing_docs)] on the struct)",
            ));
        }
    };

    let mode = match (required, default, optional) {
        (true, None, false) => Mode::Required,
        (false, Some(expr), false) => Mode::Default(expr),
        (false, None, true) => Mode::Optional,
        (false, None, false) => {
            return Err(syn::Error::new_spanned(
                attr,
                "field must have one of: required, optional, or default = value",
            ));
        }
        _ => {
            return Err(syn::Error::new_spanned(
                attr,
                "required, optional, and default = value are mutually exclusive",
            ));
        }
    };

    Ok(VarSpec {
        env_key,
        doc,
        example,
        mode,
    })
}

fn has_allow_missing_docs(attrs: &[Attribute]) -> bool {
    attrs.iter().any(is_allow_missing_docs)
}

fn is_allow_missing_docs(attr: &Attribute) -> bool {
    if !attr.path().is_ident("allow") {
        return false;
    }
    attr.parse_args::<syn::Ident>()
        .map(|ident| ident == "missing_docs")
        .unwrap_or(false)
}

/// For Option<T>, return T
fn option_inner_type(ty: &Type) -> Option<&Type> {
    let type_path = match ty {
        Type::Path(type_path) => type_path,
        _ => return None,
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let args = match &segment.arguments {
        syn::PathArguments::AngleBracketed(args) => args,
        _ => return None,
    };
    match args.args.first()? {
        syn::GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}
