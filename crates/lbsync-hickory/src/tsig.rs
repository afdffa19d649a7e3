//! TSIG key to signer conversion

use hickory_client::rr::rdata::tsig::TsigAlgorithm;
use hickory_proto::rr::Name;
use hickory_proto::rr::dnssec::tsig::TSigner;
use lbsync_core::{Error, Result, TsigKey};
use std::str::FromStr;

/// Allowed clock skew for signed messages (in seconds)
pub const TSIG_FUDGE_SECS: u16 = 300;

/// Map a key file algorithm name to a hickory algorithm.
///
/// Accepts the short BIND names (`hmac-sha256`) and the legacy
/// `hmac-md5.sig-alg.reg.int` form, case-insensitively.
pub fn tsig_algorithm(name: &str) -> Result<TsigAlgorithm> {
    let algorithm = match name.trim_end_matches('.').to_ascii_lowercase().as_str() {
        "hmac-md5" | "hmac-md5.sig-alg.reg.int" => TsigAlgorithm::HmacMd5,
        "hmac-sha1" => TsigAlgorithm::HmacSha1,
        "hmac-sha224" => TsigAlgorithm::HmacSha224,
        "hmac-sha256" => TsigAlgorithm::HmacSha256,
        "hmac-sha384" => TsigAlgorithm::HmacSha384,
        "hmac-sha512" => TsigAlgorithm::HmacSha512,
        other => {
            return Err(Error::credential(format!(
                "unsupported TSIG algorithm: {}",
                other
            )));
        }
    };
    Ok(algorithm)
}

/// Build a signer from key material
pub fn tsig_signer(key: &TsigKey) -> Result<TSigner> {
    let algorithm = tsig_algorithm(&key.algorithm)?;
    let name = Name::from_str(&key.name)
        .map_err(|e| Error::credential(format!("invalid TSIG key name {}: {}", key.name, e)))?;

    TSigner::new(key.secret.clone(), algorithm, name, TSIG_FUDGE_SECS)
        .map_err(|e| Error::credential(format!("cannot build TSIG signer: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_bind_algorithm_names() {
        assert_eq!(tsig_algorithm("hmac-sha256").unwrap(), TsigAlgorithm::HmacSha256);
        assert_eq!(tsig_algorithm("HMAC-SHA512").unwrap(), TsigAlgorithm::HmacSha512);
        assert_eq!(tsig_algorithm("hmac-sha1").unwrap(), TsigAlgorithm::HmacSha1);
        assert_eq!(
            tsig_algorithm("hmac-md5.sig-alg.reg.int.").unwrap(),
            TsigAlgorithm::HmacMd5
        );
    }

    #[test]
    fn rejects_unknown_algorithm() {
        assert!(matches!(tsig_algorithm("gss-tsig"), Err(Error::Credential(_))));
    }

    #[test]
    fn builds_signer_for_valid_key() {
        let key = TsigKey::new("local-ddns", vec![7u8; 32]);
        assert!(tsig_signer(&key).is_ok());

        let bad = TsigKey::new("local-ddns", vec![7u8; 32]).with_algorithm("rsa");
        assert!(tsig_signer(&bad).is_err());
    }
}
