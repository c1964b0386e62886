//! # Signature Production
//!
//! Produces enveloped and detached XML signatures that [`verify_embedded`]
//! accepts. Used by tooling and fixtures; contract operations only verify.
//!
//! The signature block is first written with a placeholder value. The
//! result is parsed, `SignedInfo` is canonicalized in place (so it picks up
//! the namespace context it will be verified in), signed, and the
//! placeholder is replaced.
//!
//! [`verify_embedded`]: super::verify::verify_embedded

use super::algorithms::{
    CanonicalizationMethod, DigestMethod, SignatureMethod, Transform, DSIG11_NS, DSIG_NS,
    SECP256K1_CURVE_URN,
};
use super::c14n::Canonicalizer;
use super::document::{element_qname, parse, required_child, single_signature, IdIndex};
use super::dsig::ReferenceTarget;
use crate::domain::errors::SignatureError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use cc_01_trust_validation::{Certificate, CertificateSerial, SignatureAlgorithm, SigningKey};

const PLACEHOLDER: &str = "SIGNATURE-VALUE-PENDING";

/// How the signer is named in `KeyInfo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyInfoMode {
    /// Embed the signer certificate.
    #[default]
    X509Certificate,
    /// Embed the bare public key.
    KeyValue,
    /// Name the certificate by issuer and serial.
    IssuerSerial,
}

#[derive(Debug, Clone)]
struct SignerCertificate {
    der: Vec<u8>,
    issuer: String,
    serial: CertificateSerial,
}

/// Builds XML signatures with one key.
#[derive(Debug, Clone)]
pub struct XmlSigner {
    key: SigningKey,
    certificate: Option<SignerCertificate>,
    mode: KeyInfoMode,
    canonicalization: CanonicalizationMethod,
    digest: DigestMethod,
}

impl XmlSigner {
    /// A signer that names itself by public key until given a certificate.
    pub fn new(key: SigningKey) -> Self {
        Self {
            key,
            certificate: None,
            mode: KeyInfoMode::KeyValue,
            canonicalization: CanonicalizationMethod::Exclusive,
            digest: DigestMethod::Sha256,
        }
    }

    /// Attach the signer certificate and switch to embedding it.
    #[must_use]
    pub fn with_certificate(mut self, certificate: &Certificate) -> Self {
        self.certificate = Some(SignerCertificate {
            der: certificate.der().to_vec(),
            issuer: certificate.issuer_text().to_string(),
            serial: certificate.serial().clone(),
        });
        self.mode = KeyInfoMode::X509Certificate;
        self
    }

    #[must_use]
    pub fn key_info(mut self, mode: KeyInfoMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn canonicalization(mut self, method: CanonicalizationMethod) -> Self {
        self.canonicalization = method;
        self
    }

    #[must_use]
    pub fn digest(mut self, method: DigestMethod) -> Self {
        self.digest = method;
        self
    }

    /// Insert an enveloped signature as the last child of the root element.
    pub fn sign_enveloped(
        &self,
        document: &str,
        target: &ReferenceTarget,
    ) -> Result<String, SignatureError> {
        let key_info = self.key_info_xml()?;
        let transforms = [
            Transform::EnvelopedSignature,
            Transform::Canonicalize(self.canonicalization),
        ];

        let doc = parse(document)?;
        let existing = doc
            .descendants()
            .filter(|n| n.has_tag_name((DSIG_NS, "Signature")))
            .count();
        if existing > 0 {
            return Err(SignatureError::SignatureCount(existing + 1));
        }
        let digest = self.digest.digest(self.reference_octets(&doc, target)?.as_bytes());
        let block = self.signature_xml(target, &transforms, &digest, &key_info);

        let root = doc.root_element();
        let source = &document[root.range()];
        let mut text = String::with_capacity(document.len() + block.len() + 16);
        let insert_at;
        if source.ends_with("/>") {
            // `<root/>` becomes `<root>SIG</root>`.
            let close = root.range().end - 2;
            text.push_str(&document[..close]);
            text.push('>');
            insert_at = text.len();
            text.push_str(&block);
            text.push_str("</");
            text.push_str(element_qname(root));
            text.push('>');
            text.push_str(&document[root.range().end..]);
        } else {
            let close = source
                .rfind("</")
                .map(|i| root.range().start + i)
                .ok_or_else(|| SignatureError::MalformedDocument("unterminated root".into()))?;
            insert_at = close;
            text.push_str(&document[..close]);
            text.push_str(&block);
            text.push_str(&document[close..]);
        }

        self.finish(text, insert_at)
    }

    /// A standalone `Signature` over the element carrying `id`.
    pub fn sign_detached(&self, document: &str, id: &str) -> Result<String, SignatureError> {
        let key_info = self.key_info_xml()?;
        let target = ReferenceTarget::Element(id.to_string());

        let doc = parse(document)?;
        let digest = self.digest.digest(self.reference_octets(&doc, &target)?.as_bytes());
        let block = self.signature_xml(
            &target,
            &[Transform::Canonicalize(self.canonicalization)],
            &digest,
            &key_info,
        );
        self.finish(block, 0)
    }

    fn reference_octets(
        &self,
        doc: &roxmltree::Document<'_>,
        target: &ReferenceTarget,
    ) -> Result<String, SignatureError> {
        let canonicalizer = Canonicalizer::new(self.canonicalization).without_comments();
        Ok(match target {
            ReferenceTarget::Document => canonicalizer.document(doc),
            ReferenceTarget::Element(id) => canonicalizer.subtree(IdIndex::build(doc).resolve(id)?),
        })
    }

    /// Sign the canonical `SignedInfo` of `text` and fill in the value.
    fn finish(&self, mut text: String, search_from: usize) -> Result<String, SignatureError> {
        let signed_info = {
            let doc = parse(&text)?;
            let signature = single_signature(&doc)?;
            Canonicalizer::new(self.canonicalization)
                .subtree(required_child(signature, "SignedInfo")?)
        };
        let value = STANDARD.encode(self.key.sign_fixed(signed_info.as_bytes()));

        let at = text[search_from..]
            .find(PLACEHOLDER)
            .map(|i| search_from + i)
            .ok_or(SignatureError::MissingElement("SignatureValue"))?;
        text.replace_range(at..at + PLACEHOLDER.len(), &value);
        Ok(text)
    }

    fn signature_xml(
        &self,
        target: &ReferenceTarget,
        transforms: &[Transform],
        digest: &[u8],
        key_info: &str,
    ) -> String {
        let method = SignatureMethod::for_algorithm(self.key.algorithm());
        let mut xml = format!(
            concat!(
                r#"<Signature xmlns="{ns}"><SignedInfo>"#,
                r#"<CanonicalizationMethod Algorithm="{c14n}"/>"#,
                r#"<SignatureMethod Algorithm="{method}"/>"#,
                r#"<Reference URI="{uri}"><Transforms>"#,
            ),
            ns = DSIG_NS,
            c14n = self.canonicalization.uri(),
            method = method.uri(),
            uri = escape(&target.uri()),
        );
        for transform in transforms {
            xml.push_str(&format!(r#"<Transform Algorithm="{}"/>"#, transform.uri()));
        }
        xml.push_str(&format!(
            concat!(
                r#"</Transforms><DigestMethod Algorithm="{digest_method}"/>"#,
                "<DigestValue>{digest}</DigestValue></Reference></SignedInfo>",
                "<SignatureValue>{placeholder}</SignatureValue>{key_info}</Signature>",
            ),
            digest_method = self.digest.uri(),
            digest = STANDARD.encode(digest),
            placeholder = PLACEHOLDER,
            key_info = key_info,
        ));
        xml
    }

    fn key_info_xml(&self) -> Result<String, SignatureError> {
        let public = self.key.public_key();
        match (self.mode, &self.certificate) {
            (KeyInfoMode::KeyValue, _) => match self.key.algorithm() {
                SignatureAlgorithm::Ed25519 => Ok(format!(
                    r#"<KeyInfo><DEREncodedKeyValue xmlns="{DSIG11_NS}">{}</DEREncodedKeyValue></KeyInfo>"#,
                    STANDARD.encode(public.to_spki_der()?)
                )),
                SignatureAlgorithm::EcdsaSecp256k1Sha256 => {
                    let point = public.to_sec1().ok_or(SignatureError::NoMatchingKey)?;
                    Ok(format!(
                        concat!(
                            r#"<KeyInfo><KeyValue><ECKeyValue xmlns="{ns}">"#,
                            r#"<NamedCurve URI="{curve}"/><PublicKey>{point}</PublicKey>"#,
                            "</ECKeyValue></KeyValue></KeyInfo>",
                        ),
                        ns = DSIG11_NS,
                        curve = SECP256K1_CURVE_URN,
                        point = STANDARD.encode(point),
                    ))
                }
            },
            (KeyInfoMode::X509Certificate, Some(cert)) => Ok(format!(
                "<KeyInfo><X509Data><X509Certificate>{}</X509Certificate></X509Data></KeyInfo>",
                STANDARD.encode(&cert.der)
            )),
            (KeyInfoMode::IssuerSerial, Some(cert)) => Ok(format!(
                concat!(
                    "<KeyInfo><X509Data><X509IssuerSerial>",
                    "<X509IssuerName>{}</X509IssuerName>",
                    "<X509SerialNumber>{}</X509SerialNumber>",
                    "</X509IssuerSerial></X509Data></KeyInfo>",
                ),
                escape(&cert.issuer),
                cert.serial.to_decimal()
            )),
            (_, None) => Err(SignatureError::NoMatchingKey),
        }
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
