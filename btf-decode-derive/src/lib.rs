use proc_macro::TokenStream;
use quote::{quote, ToTokens};
use syn::*;

#[proc_macro_attribute]
pub fn btf_wire(_: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as Item);

    quote! {
        #[derive(Clone, Copy, Debug, Eq, PartialEq, btf_decode_derive::FromReader)]
        #[repr(C, packed)]
        #input
    }
    .into()
}

#[proc_macro_derive(FromReader)]
pub fn from_reader_derive(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    let name = &ast.ident;

    let fields = match ast.data {
        Data::Struct(data) => match data.fields {
            Fields::Named(fields) => fields.named,
            _ => panic!("{name} is not a struct with named fields"),
        },
        _ => panic!("{name} is not a struct"),
    };

    let reader_fields = fields
        .iter()
        .map(|f| gen_reader_field(f.ident.as_ref().unwrap(), &f.ty));

    quote! {
        impl #name {
            pub(crate) fn from_reader<R: std::io::Read + std::io::Seek>(
                reader: &mut crate::reader::Reader<R>,
            ) -> crate::error::Result<Self> {
                Ok(#name {
                    #( #reader_fields )*
                })
            }
        }
    }
    .into()
}

// Generate struct fields initialization reading from the positioned reader.
// e.g. `val: reader.u32()?,`
fn gen_reader_field(ident: &Ident, r#type: &Type) -> proc_macro2::TokenStream {
    let ty = match r#type {
        Type::Path(tp) => &tp.path,
        _ => panic!("Field {ident:?} is not a plain type"),
    };

    match ty.to_token_stream().to_string().as_str() {
        "u8" => quote! {
            #ident: reader.u8()?,
        },
        "u16" => quote! {
            #ident: reader.u16()?,
        },
        "u32" => quote! {
            #ident: reader.u32()?,
        },
        "i32" => quote! {
            #ident: reader.i32()?,
        },
        ty => panic!("Unsupported field type ({ty})"),
    }
}
