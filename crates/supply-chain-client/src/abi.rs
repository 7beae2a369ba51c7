//! Contract ABI Codec
//!
//! Just enough of the Solidity ABI to talk to the SupplyChain contract:
//! `uint256`, `string` and `uint256[]` arguments, and word-indexed decoding
//! of return data.

use crate::error::ContractError;
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;

/// Size of an ABI word in bytes
pub const WORD: usize = 32;

/// 20-byte account or contract address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; 20]);

impl Address {
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl FromStr for Address {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = strip_hex_prefix(s.trim());
        let bytes = hex::decode(digits)?;
        let bytes: [u8; 20] = bytes
            .try_into()
            .map_err(|_| ContractError::Decode(format!("address {} is not 20 bytes", s)))?;
        Ok(Address(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Argument value for a contract call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Uint(u128),
    String(String),
    UintArray(Vec<u128>),
}

impl Token {
    fn is_dynamic(&self) -> bool {
        !matches!(self, Token::Uint(_))
    }
}

/// Compute the 4-byte function selector for a canonical signature
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Encode a call: selector followed by the ABI-encoded arguments
pub fn encode_call(selector: [u8; 4], args: &[Token]) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + WORD * args.len());
    out.extend_from_slice(&selector);
    out.extend(encode_args(args));
    out
}

/// Encode a tuple of arguments using the head/tail layout
pub fn encode_args(args: &[Token]) -> Vec<u8> {
    let head_len = WORD * args.len();
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for arg in args {
        if arg.is_dynamic() {
            head.extend_from_slice(&uint_word((head_len + tail.len()) as u128));
            encode_dynamic(arg, &mut tail);
        } else if let Token::Uint(value) = arg {
            head.extend_from_slice(&uint_word(*value));
        }
    }

    head.extend(tail);
    head
}

fn encode_dynamic(arg: &Token, tail: &mut Vec<u8>) {
    match arg {
        Token::String(s) => {
            let bytes = s.as_bytes();
            tail.extend_from_slice(&uint_word(bytes.len() as u128));
            tail.extend_from_slice(bytes);
            let padding = (WORD - bytes.len() % WORD) % WORD;
            tail.extend(std::iter::repeat(0u8).take(padding));
        }
        Token::UintArray(values) => {
            tail.extend_from_slice(&uint_word(values.len() as u128));
            for value in values {
                tail.extend_from_slice(&uint_word(*value));
            }
        }
        Token::Uint(_) => {}
    }
}

/// Big-endian 32-byte word holding an unsigned integer
pub fn uint_word(value: u128) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Word-indexed reader over call return data
pub struct Decoder<'a> {
    data: &'a [u8],
}

impl<'a> Decoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    fn word_at(&self, offset: usize) -> Result<&'a [u8], ContractError> {
        offset
            .checked_add(WORD)
            .and_then(|end| self.data.get(offset..end))
            .ok_or_else(|| {
                ContractError::Decode(format!(
                    "need word at byte {} but return data is {} bytes",
                    offset,
                    self.data.len()
                ))
            })
    }

    fn uint_at(&self, offset: usize) -> Result<u128, ContractError> {
        let word = self.word_at(offset)?;
        if word[..16].iter().any(|b| *b != 0) {
            return Err(ContractError::Decode(format!(
                "value at byte {} exceeds 128 bits",
                offset
            )));
        }
        let mut low = [0u8; 16];
        low.copy_from_slice(&word[16..]);
        Ok(u128::from_be_bytes(low))
    }

    /// Read the unsigned integer in head slot `index`
    pub fn uint(&self, index: usize) -> Result<u128, ContractError> {
        self.uint_at(index * WORD)
    }

    /// Read the dynamic string referenced by head slot `index`
    pub fn string(&self, index: usize) -> Result<String, ContractError> {
        let offset = to_usize(self.uint(index)?)?;
        let len = to_usize(self.uint_at(offset)?)?;
        let start = offset + WORD;
        let bytes = start
            .checked_add(len)
            .and_then(|end| self.data.get(start..end))
            .ok_or_else(|| ContractError::Decode(format!("string of {} bytes is truncated", len)))?;

        String::from_utf8(bytes.to_vec())
            .map_err(|e| ContractError::Decode(format!("string is not UTF-8: {}", e)))
    }
}

fn to_usize(value: u128) -> Result<usize, ContractError> {
    usize::try_from(value).map_err(|_| ContractError::Decode(format!("offset {} out of range", value)))
}

pub(crate) fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// `0x`-prefixed hex string of raw bytes
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decode `0x`-prefixed hex data
pub fn from_hex(s: &str) -> Result<Vec<u8>, ContractError> {
    Ok(hex::decode(strip_hex_prefix(s))?)
}

/// JSON-RPC quantity encoding (no leading zeros)
pub fn to_quantity(value: u128) -> String {
    format!("0x{:x}", value)
}

/// Parse a JSON-RPC quantity
pub fn from_quantity(s: &str) -> Result<u128, ContractError> {
    let digits = strip_hex_prefix(s);
    if digits.is_empty() {
        return Ok(0);
    }
    u128::from_str_radix(digits, 16)
        .map_err(|e| ContractError::Decode(format!("bad quantity {}: {}", s, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_selectors() {
        assert_eq!(hex::encode(selector("transfer(address,uint256)")), "a9059cbb");
        assert_eq!(hex::encode(selector("balanceOf(address)")), "70a08231");
    }

    #[test]
    fn test_encode_static_and_string() {
        let encoded = encode_args(&[Token::Uint(7), Token::String("ab".to_string())]);
        assert_eq!(encoded.len(), 4 * WORD);
        assert_eq!(encoded[..WORD], uint_word(7));
        assert_eq!(encoded[WORD..2 * WORD], uint_word(64));
        assert_eq!(encoded[2 * WORD..3 * WORD], uint_word(2));
        assert_eq!(&encoded[3 * WORD..3 * WORD + 2], b"ab");
        assert!(encoded[3 * WORD + 2..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_encode_two_arrays() {
        let encoded = encode_args(&[
            Token::UintArray(vec![1, 2]),
            Token::UintArray(vec![5]),
        ]);
        // head(2) + first array(1 + 2) + second array(1 + 1)
        assert_eq!(encoded.len(), 7 * WORD);
        assert_eq!(encoded[..WORD], uint_word(64));
        assert_eq!(encoded[WORD..2 * WORD], uint_word(160));
        assert_eq!(encoded[5 * WORD..6 * WORD], uint_word(1));
        assert_eq!(encoded[6 * WORD..], uint_word(5));
    }

    #[test]
    fn test_decode_product_tuple() {
        let data = encode_args(&[
            Token::String("Widget".to_string()),
            Token::Uint(250),
            Token::Uint(9),
        ]);
        let decoder = Decoder::new(&data);
        assert_eq!(decoder.string(0).unwrap(), "Widget");
        assert_eq!(decoder.uint(1).unwrap(), 250);
        assert_eq!(decoder.uint(2).unwrap(), 9);
    }

    #[test]
    fn test_decode_truncated() {
        let data = uint_word(1);
        let decoder = Decoder::new(&data);
        assert!(matches!(decoder.uint(1), Err(ContractError::Decode(_))));
        // offset 1 points into the middle of nowhere
        assert!(decoder.string(0).is_err());
    }

    #[test]
    fn test_decode_rejects_wide_values() {
        let mut word = [0u8; WORD];
        word[0] = 1;
        assert!(Decoder::new(&word).uint(0).is_err());
    }

    #[test]
    fn test_address_parse_and_display() {
        let address: Address = "0x5FbDB2315678afecb367f032d93F642f64180aa3".parse().unwrap();
        assert_eq!(address.to_string(), "0x5fbdb2315678afecb367f032d93f642f64180aa3");
        assert!("0x1234".parse::<Address>().is_err());
        assert!("not-hex".parse::<Address>().is_err());
    }

    #[test]
    fn test_quantity() {
        assert_eq!(to_quantity(0), "0x0");
        assert_eq!(to_quantity(255), "0xff");
        assert_eq!(from_quantity("0x1").unwrap(), 1);
        assert_eq!(from_quantity("0x").unwrap(), 0);
        assert!(from_quantity("0xzz").is_err());
    }

    proptest! {
        #[test]
        fn prop_uint_word_is_readable(value in any::<u128>()) {
            let word = uint_word(value);
            prop_assert_eq!(Decoder::new(&word).uint(0).unwrap(), value);
        }

        #[test]
        fn prop_string_tail_is_word_aligned(s in "\\PC{0,80}") {
            let encoded = encode_args(&[Token::String(s.clone())]);
            prop_assert_eq!(encoded.len() % WORD, 0);
            prop_assert_eq!(Decoder::new(&encoded).string(0).unwrap(), s);
        }
    }
}
