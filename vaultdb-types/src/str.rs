use std::convert::Infallible;
use std::str::Utf8Error;

use vaultdb_traits::{BytesDecode, BytesEncode};

/// Describes an [`str`].
pub struct Str;

impl<'a> BytesEncode<'a> for Str {
    type EItem = str;
    type ReturnBytes = &'a [u8];
    type Error = Infallible;

    fn bytes_encode(item: &'a Self::EItem) -> Result<Self::ReturnBytes, Self::Error> {
        Ok(item.as_bytes())
    }
}

impl<'a> BytesDecode<'a> for Str {
    type DItem = &'a str;

    fn bytes_decode(bytes: &'a [u8]) -> Result<Self::DItem, vaultdb_traits::BoxedError> {
        std::str::from_utf8(bytes).map_err(|e: Utf8Error| e.into())
    }
}
