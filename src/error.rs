use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Buffer too short: needed {needed} bytes, but buffer only had {remaining} bytes remaining")]
pub struct BufferTooShort {
    pub needed: usize,
    pub remaining: usize,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Invalid RTCP version {0}, expected 2")]
pub struct InvalidVersion(pub u8);

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unrecognized RTCP packet type {0}")]
pub struct UnrecognizedPacketType(pub u8);

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Invalid length value: length field showed {length_field_bytes} bytes, but buffer only had {buf_remaining_bytes} bytes remaining")]
pub struct InvalidLengthValue {
    pub length_field_bytes: usize,
    pub buf_remaining_bytes: usize,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Invalid padding: padding count {padding_bytes} with a payload of {payload_bytes} bytes")]
pub struct InvalidPadding {
    pub padding_bytes: usize,
    pub payload_bytes: usize,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Packet payload was not fully consumed: {remaining} bytes left over")]
pub struct UnconsumedPayload {
    pub remaining: usize,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unrecognized SDES item type {0}")]
pub struct UnrecognizedSdesItemType(pub u8);

#[derive(Error, Debug, PartialEq, Eq)]
#[error("SDES item value is {0} bytes, but at most 255 fit in the length field")]
pub struct SdesValueTooLong(pub usize);

#[derive(Error, Debug, PartialEq, Eq)]
#[error("BYE reason is {0} bytes, but at most 255 fit in the length field")]
pub struct ByeReasonTooLong(pub usize);

#[derive(Error, Debug, PartialEq, Eq)]
#[error("{count} entries don't fit in the 5 bit count field")]
pub struct CountOverflow {
    pub count: usize,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Payload of {0} bytes doesn't fit in the 16 bit length field")]
pub struct PayloadTooLarge(pub usize);
