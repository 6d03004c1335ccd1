//! Exit-code policy for shell callers.
//!
//! Checks run in a fixed order: HTTP failure, then validity, then (with
//! `--isvm`) virtual machine membership. An invalid MAC therefore always
//! reports `ENODEV`, never `EEXIST`.

use crate::response::{LookupResponse, classify};

/// Outcome of a completed lookup, as seen by a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// MAC is valid and, when VM checking was requested, on a virtual machine
    Valid,
    /// Service reported the MAC as invalid
    Invalid,
    /// VM checking requested and the MAC belongs to a physical machine
    NotVirtualMachine,
    /// HTTP exchange failed (status >= 300)
    HttpFailure,
}

impl Verdict {
    pub fn from_response(response: &LookupResponse, check_vm: bool) -> Self {
        if !response.is_success() {
            return Verdict::HttpFailure;
        }
        let classification = classify(response);
        if !classification.is_valid {
            return Verdict::Invalid;
        }
        if check_vm && !classification.is_virtual_machine {
            return Verdict::NotVirtualMachine;
        }
        Verdict::Valid
    }

    pub fn exit_code(self) -> i32 {
        match self {
            Verdict::Valid => 0,
            Verdict::Invalid => libc::ENODEV,
            Verdict::NotVirtualMachine => libc::EEXIST,
            Verdict::HttpFailure => libc::EIO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::render;

    fn payload(search_term: &str, is_valid: bool, vm: &str, company: &str) -> String {
        format!(
            r#"{{"macAddressDetails":{{"searchTerm":"{search_term}","isValid":{is_valid},"virtualMachine":"{vm}"}},"vendorDetails":{{"companyName":"{company}"}}}}"#
        )
    }

    fn ok(search_term: &str, is_valid: bool, vm: &str, company: &str) -> LookupResponse {
        LookupResponse::from_parts(
            200,
            "OK",
            Some(&payload(search_term, is_valid, vm, company)),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_physical_without_isvm() {
        let resp = ok("AA:BB:CC:DD:EE:FF", true, "Not detected", "Acme Corp");
        assert_eq!(Verdict::from_response(&resp, false).exit_code(), 0);
        assert_eq!(render(&resp), "MAC AA:BB:CC:DD:EE:FF (Acme Corp) ");
    }

    #[test]
    fn test_virtual_machine_with_isvm() {
        let resp = ok("00:50:56:11:22:33", true, "VMware", "VMware, Inc.");
        assert_eq!(Verdict::from_response(&resp, true), Verdict::Valid);
        assert_eq!(Verdict::from_response(&resp, true).exit_code(), 0);
        assert!(render(&resp).ends_with("on Virtual Machine"));
    }

    #[test]
    fn test_invalid_mac() {
        let resp = ok("00:00:00:00:00:00", false, "Not detected", "");
        assert_eq!(
            Verdict::from_response(&resp, false).exit_code(),
            libc::ENODEV
        );
        assert_eq!(render(&resp), "MAC  00:00:00:00:00:00 is Invalid");
    }

    #[test]
    fn test_http_not_found() {
        let resp = LookupResponse::from_parts(404, "Not Found", None).unwrap();
        assert_eq!(Verdict::from_response(&resp, false).exit_code(), libc::EIO);
        assert_eq!(render(&resp), "ERROR: 404 Not Found");
    }

    #[test]
    fn test_physical_machine_with_isvm() {
        let resp = ok("AA:BB:CC:DD:EE:FF", true, "Not detected", "Acme Corp");
        assert_eq!(
            Verdict::from_response(&resp, true).exit_code(),
            libc::EEXIST
        );
    }

    #[test]
    fn test_invalid_with_isvm_reports_invalid() {
        let resp = ok("00:00:00:00:00:00", false, "Not detected", "");
        assert_eq!(Verdict::from_response(&resp, true), Verdict::Invalid);
    }

    #[test]
    fn test_redirect_is_http_failure() {
        let resp = LookupResponse::from_parts(302, "Found", None).unwrap();
        assert_eq!(Verdict::from_response(&resp, true), Verdict::HttpFailure);
    }
}
