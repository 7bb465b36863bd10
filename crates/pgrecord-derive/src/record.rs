//! Record derive macro implementation

use crate::attrs::{field_attr, rename_all};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Record can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Record can only be derived for structs",
            ));
        }
    };

    let rule = rename_all(&input)?;
    let record_name = name.to_string();

    let mut shape_fields = Vec::new();
    let mut to_map = Vec::new();
    let mut from_map = Vec::new();
    let mut columns: Vec<String> = Vec::new();

    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let ty = &field.ty;
        let attr = field_attr(field)?;

        if attr.skip {
            from_map.push(quote! { #ident: ::std::default::Default::default() });
            continue;
        }

        let declared = ident.to_string();
        let declared = declared.strip_prefix("r#").unwrap_or(&declared);
        let column = match (attr.column, rule) {
            (Some(column), _) => column,
            (None, Some(rule)) => rule.apply(declared),
            (None, None) => declared.to_string(),
        };
        if columns.contains(&column) {
            return Err(syn::Error::new_spanned(
                field,
                format!("duplicate record column name {column:?}"),
            ));
        }
        columns.push(column.clone());

        if attr.nested {
            shape_fields.push(quote! {
                .nested(#column, <#ty as ::pgrecord::Record>::shape())
            });
            to_map.push(quote! {
                map.insert(
                    #column,
                    ::pgrecord::Value::Record(::pgrecord::Record::to_field_map(&self.#ident)),
                );
            });
            from_map.push(quote! { #ident: map.take_record::<#ty>(#column)? });
        } else {
            shape_fields.push(quote! {
                .field(#column, <#ty as ::pgrecord::FieldType>::kind())
            });
            to_map.push(quote! {
                map.insert(#column, ::pgrecord::FieldType::to_value(&self.#ident));
            });
            from_map.push(quote! { #ident: map.take::<#ty>(#column)? });
        }
    }

    let capacity = columns.len();

    Ok(quote! {
        impl #impl_generics ::pgrecord::Record for #name #ty_generics #where_clause {
            fn shape() -> ::pgrecord::RecordShape {
                ::pgrecord::RecordShape::new(#record_name)
                    #(#shape_fields)*
            }

            fn to_field_map(&self) -> ::pgrecord::FieldMap {
                let mut map = ::pgrecord::FieldMap::with_capacity(#capacity);
                #(#to_map)*
                map
            }

            #[allow(unused_mut)]
            fn from_field_map(
                mut map: ::pgrecord::FieldMap,
            ) -> ::pgrecord::OrmResult<Self> {
                ::std::result::Result::Ok(Self {
                    #(#from_map),*
                })
            }
        }
    })
}
