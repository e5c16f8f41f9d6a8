//! AWS Signature Version 4 request signing

use aws_credential_types::Credentials;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};

use crate::utils::error::{DeployError, Result};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// AWS SigV4 signer for one service in one region
#[derive(Debug, Clone)]
pub struct SigV4Signer {
    access_key: String,
    secret_key: String,
    session_token: Option<String>,
    region: String,
    service: String,
}

impl SigV4Signer {
    /// Create a new SigV4 signer
    pub fn new(
        access_key: String,
        secret_key: String,
        session_token: Option<String>,
        region: String,
        service: impl Into<String>,
    ) -> Self {
        Self {
            access_key,
            secret_key,
            session_token,
            region,
            service: service.into(),
        }
    }

    /// Create a signer from resolved credentials
    pub fn from_credentials(
        credentials: &Credentials,
        region: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        Self::new(
            credentials.access_key_id().to_string(),
            credentials.secret_access_key().to_string(),
            credentials.session_token().map(str::to_string),
            region.into(),
            service,
        )
    }

    /// Sign an HTTP request with AWS SigV4
    ///
    /// Returns the headers to send, including `host`, `x-amz-date` and
    /// `Authorization`. Every header passed in is signed.
    pub fn sign_request(
        &self,
        method: &str,
        url: &str,
        headers: &HashMap<String, String>,
        body: &[u8],
        timestamp: DateTime<Utc>,
    ) -> Result<HashMap<String, String>> {
        let url = url::Url::parse(url)
            .map_err(|e| DeployError::signing(format!("Invalid URL: {}", e)))?;
        let host = url
            .host_str()
            .map(|host| match url.port() {
                Some(port) => format!("{}:{}", host, port),
                None => host.to_string(),
            })
            .ok_or_else(|| DeployError::signing("Missing host in URL"))?;

        let amz_date = timestamp.format("%Y%m%dT%H%M%SZ").to_string();
        let date_stamp = timestamp.format("%Y%m%d").to_string();

        // BTreeMap keeps the canonical (lowercase, sorted) header order
        let mut signed: BTreeMap<String, String> = headers
            .iter()
            .map(|(name, value)| (name.to_lowercase(), value.trim().to_string()))
            .collect();
        signed.insert("host".to_string(), host);
        signed.insert("x-amz-date".to_string(), amz_date.clone());
        if let Some(token) = &self.session_token {
            signed.insert("x-amz-security-token".to_string(), token.clone());
        }

        let signed_names = signed.keys().cloned().collect::<Vec<_>>().join(";");
        let canonical_request = canonical_request(
            method,
            url.path(),
            url.query().unwrap_or_default(),
            &signed,
            &signed_names,
            body,
        );

        let scope = format!(
            "{}/{}/{}/aws4_request",
            date_stamp, self.region, self.service
        );
        let string_to_sign = [
            ALGORITHM,
            amz_date.as_str(),
            scope.as_str(),
            hex::encode(Sha256::digest(canonical_request.as_bytes())).as_str(),
        ]
        .join("\n");

        let signing_key = self.signing_key(&date_stamp)?;
        let signature = hex::encode(hmac_sha256(&signing_key, string_to_sign.as_bytes())?);

        let mut out: HashMap<String, String> = signed.into_iter().collect();
        out.insert(
            "Authorization".to_string(),
            format!(
                "{} Credential={}/{}, SignedHeaders={}, Signature={}",
                ALGORITHM, self.access_key, scope, signed_names, signature
            ),
        );
        Ok(out)
    }

    /// `kSigning` for one day, region and service
    fn signing_key(&self, date_stamp: &str) -> Result<Vec<u8>> {
        let secret = format!("AWS4{}", self.secret_key);
        [
            date_stamp.as_bytes(),
            self.region.as_bytes(),
            self.service.as_bytes(),
            "aws4_request".as_bytes(),
        ]
        .iter()
        .try_fold(secret.into_bytes(), |key, part| hmac_sha256(&key, part))
    }
}

fn canonical_request(
    method: &str,
    path: &str,
    query: &str,
    headers: &BTreeMap<String, String>,
    signed_names: &str,
    body: &[u8],
) -> String {
    let header_lines: String = headers
        .iter()
        .map(|(name, value)| format!("{}:{}\n", name, value))
        .collect();
    format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        method.to_uppercase(),
        path,
        query,
        header_lines,
        signed_names,
        hex::encode(Sha256::digest(body))
    )
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| DeployError::signing(format!("HMAC key error: {}", e)))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}
