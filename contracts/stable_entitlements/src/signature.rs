//! HMAC-SHA256 payment signatures over `order_id|payment_id`.

use soroban_sdk::{Bytes, BytesN, Env, String};

const BLOCK_LEN: usize = 64;
const DIGEST_LEN: usize = 32;
const HEX_LEN: usize = DIGEST_LEN * 2;
/// Longest gateway order or payment id accepted, in bytes.
const MAX_ID_LEN: usize = 64;

pub fn hmac_sha256(env: &Env, key: &Bytes, message: &Bytes) -> BytesN<32> {
    let mut block = [0u8; BLOCK_LEN];
    if key.len() as usize > BLOCK_LEN {
        let hashed: BytesN<32> = env.crypto().sha256(key).into();
        block[..DIGEST_LEN].copy_from_slice(&hashed.to_array());
    } else {
        key.copy_into_slice(&mut block[..key.len() as usize]);
    }

    let mut inner_pad = [0u8; BLOCK_LEN];
    let mut outer_pad = [0u8; BLOCK_LEN];
    for i in 0..BLOCK_LEN {
        inner_pad[i] = block[i] ^ 0x36;
        outer_pad[i] = block[i] ^ 0x5c;
    }

    let mut inner = Bytes::from_array(env, &inner_pad);
    inner.append(message);
    let inner_digest: BytesN<32> = env.crypto().sha256(&inner).into();

    let mut outer = Bytes::from_array(env, &outer_pad);
    outer.append(&Bytes::from_array(env, &inner_digest.to_array()));
    env.crypto().sha256(&outer).into()
}

/// Expected signature for a gateway order/payment pair, or `None` when an id
/// is empty or longer than the gateway ever issues.
pub fn expected_signature(
    env: &Env,
    secret: &Bytes,
    order_id: &String,
    payment_id: &String,
) -> Option<BytesN<32>> {
    let order_len = order_id.len() as usize;
    let payment_len = payment_id.len() as usize;
    if order_len == 0 || payment_len == 0 || order_len > MAX_ID_LEN || payment_len > MAX_ID_LEN {
        return None;
    }

    let mut buf = [0u8; MAX_ID_LEN * 2 + 1];
    order_id.copy_into_slice(&mut buf[..order_len]);
    buf[order_len] = b'|';
    let end = order_len + 1 + payment_len;
    payment_id.copy_into_slice(&mut buf[order_len + 1..end]);

    let message = Bytes::from_slice(env, &buf[..end]);
    Some(hmac_sha256(env, secret, &message))
}

/// Checks a hex-encoded signature in constant time with respect to its content.
pub fn verify(
    env: &Env,
    secret: &Bytes,
    order_id: &String,
    payment_id: &String,
    signature_hex: &String,
) -> bool {
    let Some(expected) = expected_signature(env, secret, order_id, payment_id) else {
        return false;
    };
    let Some(given) = decode_hex(signature_hex) else {
        return false;
    };
    constant_time_eq(&expected.to_array(), &given)
}

pub fn constant_time_eq(a: &[u8; DIGEST_LEN], b: &[u8; DIGEST_LEN]) -> bool {
    let mut diff = 0u8;
    for i in 0..DIGEST_LEN {
        diff |= a[i] ^ b[i];
    }
    diff == 0
}

/// Lowercase hex encoding of a digest, as the gateway sends it.
pub fn encode_hex(digest: &BytesN<32>) -> [u8; HEX_LEN] {
    const ALPHABET: &[u8; 16] = b"0123456789abcdef";
    let mut out = [0u8; HEX_LEN];
    for (i, byte) in digest.to_array().iter().enumerate() {
        out[2 * i] = ALPHABET[(byte >> 4) as usize];
        out[2 * i + 1] = ALPHABET[(byte & 0x0f) as usize];
    }
    out
}

fn decode_hex(hex: &String) -> Option<[u8; DIGEST_LEN]> {
    if hex.len() as usize != HEX_LEN {
        return None;
    }
    let mut chars = [0u8; HEX_LEN];
    hex.copy_into_slice(&mut chars);

    let mut out = [0u8; DIGEST_LEN];
    for i in 0..DIGEST_LEN {
        let hi = nibble(chars[2 * i])?;
        let lo = nibble(chars[2 * i + 1])?;
        out[i] = (hi << 4) | lo;
    }
    Some(out)
}

fn nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}
