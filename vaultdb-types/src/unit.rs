use std::borrow::Cow;

use bytemuck::PodCastError;
use vaultdb_traits::{BoxedError, BytesDecode, BytesEncode};

/// Describes the `()` type.
pub struct Unit;

impl<'a> BytesEncode<'a> for Unit {
    type EItem = ();
    type ReturnBytes = Cow<'a, [u8]>;
    type Error = BoxedError;

    fn bytes_encode(_item: &Self::EItem) -> Result<Self::ReturnBytes, Self::Error> {
        Ok(Cow::Borrowed(&[]))
    }
}

impl BytesDecode<'_> for Unit {
    type DItem = ();

    fn bytes_decode(bytes: &[u8]) -> Result<Self::DItem, BoxedError> {
        if bytes.is_empty() {
            Ok(())
        } else {
            Err(PodCastError::SizeMismatch.into())
        }
    }
}
