//! Signing identities enumerated from the local certificate agent.

use super::types::Thumbprint;

/// Taxpayer identifiers carried in the certificate subject.
///
/// Brazilian ICP certificates embed the individual (CPF) or company (CNPJ)
/// registration number; a certificate with neither is not usable for
/// signing documents in this workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectIdentifiers {
    pub cpf: Option<String>,
    pub cnpj: Option<String>,
}

impl SubjectIdentifiers {
    #[must_use]
    pub fn new(cpf: Option<String>, cnpj: Option<String>) -> Self {
        Self {
            cpf: cpf.filter(|v| !v.trim().is_empty()),
            cnpj: cnpj.filter(|v| !v.trim().is_empty()),
        }
    }

    #[must_use]
    pub fn is_present(&self) -> bool {
        self.cpf.is_some() || self.cnpj.is_some()
    }
}

/// One certificate usable for signing. Immutable once enumerated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningIdentity {
    thumbprint: Thumbprint,
    subject_name: String,
    issuer_name: Option<String>,
    identifiers: SubjectIdentifiers,
    eligible: bool,
}

impl SigningIdentity {
    #[must_use]
    pub fn new(
        thumbprint: Thumbprint,
        subject_name: impl Into<String>,
        issuer_name: Option<String>,
        identifiers: SubjectIdentifiers,
    ) -> Self {
        let eligible = identifiers.is_present();
        Self {
            thumbprint,
            subject_name: subject_name.into(),
            issuer_name,
            identifiers,
            eligible,
        }
    }

    #[must_use]
    pub fn thumbprint(&self) -> &Thumbprint {
        &self.thumbprint
    }

    #[must_use]
    pub fn subject_name(&self) -> &str {
        &self.subject_name
    }

    #[must_use]
    pub fn issuer_name(&self) -> Option<&str> {
        self.issuer_name.as_deref()
    }

    #[must_use]
    pub fn identifiers(&self) -> &SubjectIdentifiers {
        &self.identifiers
    }

    /// Whether the subject carries the identifiers required for signing.
    #[must_use]
    pub fn is_eligible(&self) -> bool {
        self.eligible
    }
}

/// Keep only identities that carry a CPF or CNPJ.
#[must_use]
pub fn eligible_identities(identities: Vec<SigningIdentity>) -> Vec<SigningIdentity> {
    identities.into_iter().filter(SigningIdentity::is_eligible).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(thumb: &str, cpf: Option<&str>, cnpj: Option<&str>) -> SigningIdentity {
        SigningIdentity::new(
            Thumbprint::new(thumb).unwrap(),
            format!("CN=Holder {thumb}"),
            None,
            SubjectIdentifiers::new(cpf.map(String::from), cnpj.map(String::from)),
        )
    }

    #[test]
    fn test_eligibility_follows_identifiers() {
        assert!(identity("a1", Some("12345678901"), None).is_eligible());
        assert!(identity("a2", None, Some("12345678000199")).is_eligible());
        assert!(!identity("a3", None, None).is_eligible());
        // Blank values count as absent
        assert!(!identity("a4", Some("  "), Some("")).is_eligible());
    }

    #[test]
    fn test_eligible_identities_filter() {
        let all = vec![
            identity("a1", Some("12345678901"), None),
            identity("a2", None, None),
            identity("a3", None, Some("12345678000199")),
        ];

        let eligible = eligible_identities(all);
        let thumbs: Vec<&str> = eligible.iter().map(|i| i.thumbprint().as_str()).collect();
        assert_eq!(thumbs, vec!["a1", "a3"]);
    }
}
