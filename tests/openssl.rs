mod util;

use chainkit::bundle::BundleExporter;
use chainkit::config::ExportConfig;
use openssl::pkcs12::Pkcs12;
use openssl::stack::Stack;
use openssl::x509::store::X509StoreBuilder;
use openssl::x509::{X509, X509StoreContext, X509VerifyResult};

fn to_openssl(issued: &chainkit::chain::IssuedCertificate) -> X509 {
    let pem = issued.certificate().to_pem().expect("certificate encodes");
    X509::from_pem(pem.as_bytes()).expect("Failed to parse PEM")
}

#[test]
fn test_openssl_crate_verifies_chain() {
    let chain = util::current_chain();

    let root = to_openssl(&chain.root);
    let intermediate = to_openssl(&chain.intermediate);
    let leaf = to_openssl(&chain.leaf);

    let mut store = X509StoreBuilder::new().unwrap();
    store.add_cert(root).unwrap();
    let store = store.build();

    let mut untrusted = Stack::new().unwrap();
    untrusted.push(intermediate).unwrap();

    let mut context = X509StoreContext::new().unwrap();
    let (verified, result) = context
        .init(&store, &leaf, &untrusted, |ctx| {
            let verified = ctx.verify_cert()?;
            Ok((verified, ctx.error()))
        })
        .unwrap();

    assert!(
        verified,
        "chain rejected: {}",
        result.error_string()
    );
    assert_eq!(result.as_raw(), X509VerifyResult::OK.as_raw());
}

#[test]
fn test_openssl_crate_reads_leaf_fields() {
    let chain = util::fixed_chain();
    let leaf = to_openssl(&chain.leaf);

    let subject = leaf
        .subject_name()
        .entries_by_nid(openssl::nid::Nid::COMMONNAME)
        .next()
        .unwrap()
        .data()
        .as_utf8()
        .unwrap();
    assert_eq!(subject.to_string(), "Experimental Leaf Node", "Subject CN mismatch");

    let issuer = leaf
        .issuer_name()
        .entries_by_nid(openssl::nid::Nid::COMMONNAME)
        .next()
        .unwrap()
        .data()
        .as_utf8()
        .unwrap();
    assert_eq!(
        issuer.to_string(),
        "Experimental Intermediate Issuing Authority",
        "Issuer CN mismatch"
    );

    assert_eq!(leaf.version(), 2, "X509 version should be 3 (0-based index)");
    assert_eq!(
        leaf.signature_algorithm().object().nid(),
        openssl::nid::Nid::ECDSA_WITH_SHA256
    );

    let names: Vec<String> = leaf
        .subject_alt_names()
        .unwrap()
        .iter()
        .filter_map(|name| name.dnsname().map(str::to_string))
        .collect();
    assert_eq!(names, ["www.test.com", "test.com"]);

    let serial = leaf.serial_number().to_bn().unwrap().to_dec_str().unwrap();
    assert_eq!(serial.to_string(), chain.leaf.serial().value().to_string());
}

#[test]
fn test_openssl_crate_matches_key_identifiers() {
    let chain = util::fixed_chain();
    let intermediate = to_openssl(&chain.intermediate);
    let leaf = to_openssl(&chain.leaf);

    let issuer_ski = intermediate.subject_key_id().unwrap().as_slice().to_vec();
    let leaf_aki = leaf.authority_key_id().unwrap().as_slice().to_vec();
    assert_eq!(issuer_ski, leaf_aki);
    assert_eq!(issuer_ski, chain.intermediate.subject_key_identifier().0);
}

#[test]
fn test_openssl_crate_opens_exported_bundles() {
    let temp = tempfile::tempdir().unwrap();
    let chain = util::fixed_chain();
    let expected: Vec<_> = chain
        .iter()
        .map(|issued| (issued.tier(), issued.certificate().to_der().unwrap()))
        .collect();

    let exporter = BundleExporter::new(
        ExportConfig::builder()
            .output_dir(temp.path().to_path_buf())
            .build(),
    );
    exporter.export(chain).unwrap();

    for (tier, cert_der) in expected {
        let der = std::fs::read(temp.path().join(format!("{tier}.pfx"))).unwrap();
        let parsed = Pkcs12::from_der(&der)
            .unwrap()
            .parse2("export")
            .unwrap_or_else(|err| panic!("openssl rejected {tier}.pfx: {err}"));

        let cert = parsed.cert.expect("bundle carries a certificate");
        let key = parsed.pkey.expect("bundle carries a private key");
        assert_eq!(cert.to_der().unwrap(), cert_der, "{tier} certificate");
        assert!(cert.public_key().unwrap().public_eq(&key), "{tier} key pair");
        assert!(parsed.ca.is_none_or(|ca| ca.is_empty()));

        assert!(Pkcs12::from_der(&der).unwrap().parse2("wrong").is_err());
    }
}
