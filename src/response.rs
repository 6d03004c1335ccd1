//! Lookup response decoding, classification and rendering.

use std::fmt;

use serde::Deserialize;

use crate::error::LookupError;

/// Statuses below this are a successful lookup.
pub const HTTP_OK_LIMIT: u16 = 300;

/// Statuses at or above this carry no usable body.
pub const HTTP_BAD_REQUEST: u16 = 400;

/// The service's literal for "no virtualization vendor matched".
pub const NOT_DETECTED: &str = "Not detected";

/// Vendor registration for the MAC's OUI block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorDetails {
    /// Empty for valid but unregistered MACs
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub oui: Option<String>,
    #[serde(default)]
    pub company_address: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
}

/// Per-address facts reported by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacDetails {
    /// Echo of the queried MAC
    pub search_term: String,
    pub is_valid: bool,
    /// [`NOT_DETECTED`] unless the MAC is in a hypervisor-assigned range
    pub virtual_machine_vendor: String,
    pub transmission_type: Option<String>,
    pub administration_type: Option<String>,
    pub vendor: VendorDetails,
}

impl MacDetails {
    pub fn is_virtual_machine(&self) -> bool {
        self.virtual_machine_vendor != NOT_DETECTED
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MacAddressDetailsWire {
    #[serde(default)]
    search_term: String,
    is_valid: bool,
    #[serde(default = "not_detected")]
    virtual_machine: String,
    #[serde(default)]
    transmission_type: Option<String>,
    #[serde(default)]
    administration_type: Option<String>,
}

fn not_detected() -> String {
    NOT_DETECTED.to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PayloadWire {
    mac_address_details: MacAddressDetailsWire,
    #[serde(default)]
    vendor_details: VendorDetails,
}

impl From<PayloadWire> for MacDetails {
    fn from(wire: PayloadWire) -> Self {
        let mac = wire.mac_address_details;
        MacDetails {
            search_term: mac.search_term,
            is_valid: mac.is_valid,
            virtual_machine_vendor: mac.virtual_machine,
            transmission_type: mac.transmission_type,
            administration_type: mac.administration_type,
            vendor: wire.vendor_details,
        }
    }
}

/// Result of one exchange with the lookup service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResponse {
    pub http_status: u16,
    /// Standard reason phrase for `http_status`; the server's own wording is not kept
    pub http_reason: String,
    /// Present only when the service returned a lookup payload
    pub details: Option<MacDetails>,
}

impl LookupResponse {
    /// Build a response from the status line and, when it was read, the body.
    ///
    /// The body is only decoded for successful statuses (100..300), where a
    /// JSON payload is mandatory. Redirects and errors keep status and reason only.
    pub fn from_parts(
        http_status: u16,
        http_reason: impl Into<String>,
        body: Option<&str>,
    ) -> crate::Result<Self> {
        let http_reason = http_reason.into();
        if !(100..HTTP_OK_LIMIT).contains(&http_status) {
            return Ok(Self {
                http_status,
                http_reason,
                details: None,
            });
        }

        let json = body.and_then(locate_json_object).ok_or_else(|| {
            LookupError::Protocol(format!(
                "HTTP {} response carried no JSON object",
                http_status
            ))
        })?;

        Ok(Self {
            http_status,
            http_reason,
            details: Some(decode_payload(json)?),
        })
    }

    /// True when the HTTP exchange itself succeeded (status 100..300).
    pub fn is_success(&self) -> bool {
        (100..HTTP_OK_LIMIT).contains(&self.http_status)
    }
}

/// Skip leading lines (stray headers, chunk sizes) up to the first line that
/// opens a JSON object.
fn locate_json_object(body: &str) -> Option<&str> {
    let mut offset = 0;
    for line in body.split_inclusive('\n') {
        if line.trim_start().starts_with('{') {
            return Some(&body[offset..]);
        }
        offset += line.len();
    }
    None
}

fn decode_payload(json: &str) -> crate::Result<MacDetails> {
    // Stream-decode so trailing bytes after the object (e.g. a chunk
    // terminator) do not fail the parse.
    let mut stream = serde_json::Deserializer::from_str(json).into_iter::<PayloadWire>();
    match stream.next() {
        Some(Ok(payload)) => Ok(payload.into()),
        Some(Err(e)) => Err(LookupError::Protocol(format!(
            "failed to decode lookup payload: {}",
            e
        ))),
        None => Err(LookupError::Protocol("empty lookup payload".to_string())),
    }
}

/// The two facts a caller acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Classification {
    pub is_valid: bool,
    pub is_virtual_machine: bool,
}

/// Derive validity and VM membership. Both are false unless the exchange succeeded.
pub fn classify(response: &LookupResponse) -> Classification {
    if !response.is_success() {
        return Classification::default();
    }
    match &response.details {
        Some(details) if details.is_valid => Classification {
            is_valid: true,
            is_virtual_machine: details.is_virtual_machine(),
        },
        _ => Classification::default(),
    }
}

/// One-line human-readable summary of a response.
pub fn render(response: &LookupResponse) -> String {
    response.to_string()
}

impl fmt::Display for LookupResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.http_status < HTTP_BAD_REQUEST {
            if let Some(details) = &self.details {
                if !details.is_valid {
                    return write!(f, "MAC  {} is Invalid", details.search_term);
                }
                write!(
                    f,
                    "MAC {} ({}) ",
                    details.search_term, details.vendor.company_name
                )?;
                if details.is_virtual_machine() {
                    f.write_str("on Virtual Machine")?;
                }
                return Ok(());
            }
        }
        write!(f, "ERROR: {} {}", self.http_status, self.http_reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(search_term: &str, is_valid: bool, vm: &str, company: &str) -> String {
        format!(
            r#"{{"vendorDetails":{{"oui":"AABBCC","isPrivate":false,"companyName":"{company}","countryCode":"US"}},"blockDetails":{{"blockFound":true}},"macAddressDetails":{{"searchTerm":"{search_term}","isValid":{is_valid},"virtualMachine":"{vm}","transmissionType":"unicast","administrationType":"UAA"}}}}"#
        )
    }

    fn ok(search_term: &str, is_valid: bool, vm: &str, company: &str) -> LookupResponse {
        LookupResponse::from_parts(200, "OK", Some(&body(search_term, is_valid, vm, company)))
            .unwrap()
    }

    #[test]
    fn test_decode_payload_fields() {
        let resp = ok("AA:BB:CC:DD:EE:FF", true, "Not detected", "Acme Corp");
        let details = resp.details.unwrap();
        assert_eq!(details.search_term, "AA:BB:CC:DD:EE:FF");
        assert!(details.is_valid);
        assert_eq!(details.vendor.company_name, "Acme Corp");
        assert_eq!(details.vendor.oui.as_deref(), Some("AABBCC"));
        assert_eq!(details.vendor.country_code.as_deref(), Some("US"));
        assert_eq!(details.transmission_type.as_deref(), Some("unicast"));
    }

    #[test]
    fn test_json_after_header_lines() {
        let raw = format!(
            "Content-Type: application/json\r\nServer: nginx\r\n\r\n{}\r\n",
            body("AA:BB:CC:DD:EE:FF", true, "VMware", "VMware, Inc.")
        );
        let resp = LookupResponse::from_parts(200, "OK", Some(&raw)).unwrap();
        assert_eq!(
            resp.details.unwrap().virtual_machine_vendor,
            "VMware"
        );
    }

    #[test]
    fn test_json_with_chunk_framing() {
        let json = body("AA:BB:CC:DD:EE:FF", false, "Not detected", "");
        let raw = format!("{:x}\r\n{}\r\n0\r\n\r\n", json.len(), json);
        let resp = LookupResponse::from_parts(200, "OK", Some(&raw)).unwrap();
        assert!(!resp.details.unwrap().is_valid);
    }

    #[test]
    fn test_pretty_printed_json() {
        let raw = r#"{
  "macAddressDetails": {
    "searchTerm": "00:00:00:00:00:00",
    "isValid": false,
    "virtualMachine": "Not detected"
  }
}"#;
        let resp = LookupResponse::from_parts(200, "OK", Some(raw)).unwrap();
        let details = resp.details.unwrap();
        assert!(!details.is_valid);
        assert_eq!(details.vendor, VendorDetails::default());
    }

    #[test]
    fn test_undecodable_json_is_protocol_error() {
        let result = LookupResponse::from_parts(200, "OK", Some("{\"macAddressDetails\": "));
        assert!(matches!(result, Err(LookupError::Protocol(msg)) if msg.contains("decode")));
    }

    #[test]
    fn test_missing_json_on_success_is_protocol_error() {
        let result = LookupResponse::from_parts(200, "OK", Some("<html>maintenance</html>"));
        assert!(matches!(result, Err(LookupError::Protocol(_))));
    }

    #[test]
    fn test_error_status_ignores_body() {
        let resp = LookupResponse::from_parts(404, "Not Found", Some("{not json")).unwrap();
        assert_eq!(resp.http_status, 404);
        assert!(resp.details.is_none());
    }

    #[test]
    fn test_redirect_without_body() {
        let resp = LookupResponse::from_parts(302, "Found", Some("")).unwrap();
        assert!(resp.details.is_none());
        assert!(!resp.is_success());
    }

    #[test]
    fn test_redirect_ignores_json_body() {
        let resp = LookupResponse::from_parts(302, "Found", Some(r#"{"error":"moved"}"#)).unwrap();
        assert!(resp.details.is_none());
        assert_eq!(render(&resp), "ERROR: 302 Found");
    }

    #[test]
    fn test_redirect_ignores_lookup_payload() {
        let raw = body("AA:BB:CC:DD:EE:FF", true, "VMware", "Acme Corp");
        let resp = LookupResponse::from_parts(301, "Moved Permanently", Some(&raw)).unwrap();
        assert!(resp.details.is_none());
        assert_eq!(classify(&resp), Classification::default());
    }

    #[test]
    fn test_classify_valid_physical() {
        let resp = ok("AA:BB:CC:DD:EE:FF", true, "Not detected", "Acme Corp");
        assert_eq!(
            classify(&resp),
            Classification {
                is_valid: true,
                is_virtual_machine: false
            }
        );
    }

    #[test]
    fn test_classify_valid_virtual() {
        let resp = ok("00:50:56:00:00:01", true, "VMware", "VMware, Inc.");
        assert_eq!(
            classify(&resp),
            Classification {
                is_valid: true,
                is_virtual_machine: true
            }
        );
    }

    #[test]
    fn test_classify_invalid_never_vm() {
        let resp = ok("00:00:00:00:00:00", false, "VMware", "");
        assert_eq!(classify(&resp), Classification::default());
    }

    #[test]
    fn test_classify_failed_status_regardless_of_body() {
        for status in [300, 302, 401, 404, 500] {
            let mut resp = ok("00:50:56:00:00:01", true, "VMware", "VMware, Inc.");
            resp.http_status = status;
            assert_eq!(classify(&resp), Classification::default(), "status {status}");
        }
    }

    #[test]
    fn test_render_valid_physical() {
        let resp = ok("AA:BB:CC:DD:EE:FF", true, "Not detected", "Acme Corp");
        assert_eq!(render(&resp), "MAC AA:BB:CC:DD:EE:FF (Acme Corp) ");
    }

    #[test]
    fn test_render_valid_virtual() {
        let resp = ok("00:50:56:00:00:01", true, "VMware", "VMware, Inc.");
        assert_eq!(
            render(&resp),
            "MAC 00:50:56:00:00:01 (VMware, Inc.) on Virtual Machine"
        );
    }

    #[test]
    fn test_render_invalid() {
        let resp = ok("00:00:00:00:00:00", false, "Not detected", "");
        assert_eq!(render(&resp), "MAC  00:00:00:00:00:00 is Invalid");
    }

    #[test]
    fn test_render_http_error_skips_details() {
        // Details left over from a decode must not leak into an error line.
        let mut resp = ok("AA:BB:CC:DD:EE:FF", true, "VMware", "Acme Corp");
        resp.http_status = 404;
        resp.http_reason = "Not Found".to_string();
        assert_eq!(render(&resp), "ERROR: 404 Not Found");
    }

    #[test]
    fn test_render_redirect_without_details() {
        let resp = LookupResponse::from_parts(301, "Moved Permanently", None).unwrap();
        assert_eq!(render(&resp), "ERROR: 301 Moved Permanently");
    }
}
