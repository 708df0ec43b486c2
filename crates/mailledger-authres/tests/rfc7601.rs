//! Integration tests against the RFC 7601 examples.
//!
//! Header values are given the way they appear after the field name,
//! including folding where the RFC shows it.

#![allow(clippy::unwrap_used)]

use mailledger_authres::{
    AuthenticationResult, AuthenticationResults, ErrorKind, ParseOptions, Parser, Property,
    PropertyType, PropertyTypePolicy, parse, parse_bytes,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn result(method: &str, result: &str, properties: Vec<Property>) -> AuthenticationResult {
    AuthenticationResult {
        method: method.to_string(),
        version: None,
        result: result.to_string(),
        reason: None,
        properties,
    }
}

#[test]
fn test_none_with_version() {
    init_tracing();
    let ar = parse("test.example.org 1; none").unwrap();
    assert_eq!(
        ar,
        AuthenticationResults {
            authserv_id: "test.example.org".to_string(),
            version: Some("1".to_string()),
            results: vec![],
        }
    );
}

#[test]
fn test_spf_pass() {
    init_tracing();
    let ar = parse("example.com; spf=pass smtp.mailfrom=example.net").unwrap();
    assert_eq!(ar.authserv_id, "example.com");
    assert_eq!(ar.version, None);
    assert_eq!(
        ar.results,
        vec![result(
            "spf",
            "pass",
            vec![Property::new("smtp", "mailfrom", "example.net")]
        )]
    );
}

#[test]
fn test_iprev_quoted_value() {
    init_tracing();
    let ar = parse("example.com; iprev=pass policy.iprev=\"127.0.0.1\"").unwrap();
    assert_eq!(
        ar.results,
        vec![result(
            "iprev",
            "pass",
            vec![Property::new("policy", "iprev", "127.0.0.1")]
        )]
    );
}

#[test]
fn test_two_dkim_results_in_order() {
    init_tracing();
    let ar = parse(
        "example.com; dkim=pass (good signature) header.d=mail-router.example.net; \
         dkim=fail (bad signature) header.d=newyork.example.com",
    )
    .unwrap();
    assert_eq!(
        ar.results,
        vec![
            result(
                "dkim",
                "pass",
                vec![Property::new("header", "d", "mail-router.example.net")]
            ),
            result(
                "dkim",
                "fail",
                vec![Property::new("header", "d", "newyork.example.com")]
            ),
        ]
    );
}

#[test]
fn test_reason_and_comment_with_semicolon() {
    init_tracing();
    let ar = parse(
        "example.com; dkim=fail reason=\"signature verification failed\" \
         (2048-bit key; insecure) header.d=mail-router.example.net",
    )
    .unwrap();
    assert_eq!(ar.results.len(), 1);
    let dkim = &ar.results[0];
    assert_eq!(dkim.method, "dkim");
    assert_eq!(dkim.result, "fail");
    assert_eq!(dkim.reason.as_deref(), Some("signature verification failed"));
    assert_eq!(
        dkim.properties,
        vec![Property::new("header", "d", "mail-router.example.net")]
    );
}

#[test]
fn test_unsupported_version() {
    init_tracing();
    let err = parse("example.com 2; none").unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::UnsupportedVersion("2".to_string()));
}

/// RFC 7601 Appendix B.2
#[test]
fn test_rfc_b2_nearly_trivial() {
    let ar = parse("example.org 1; none").unwrap();
    assert_eq!(ar.authserv_id, "example.org");
    assert_eq!(ar.version.as_deref(), Some("1"));
    assert!(ar.is_empty());
}

/// RFC 7601 Appendix B.4
#[test]
fn test_rfc_b4_smtp_auth_and_spf() {
    let ar = parse(concat!(
        "example.com;\r\n",
        "          auth=pass (cram-md5) smtp.auth=sender@example.net;\r\n",
        "          spf=pass smtp.mailfrom=example.net"
    ))
    .unwrap();
    assert_eq!(
        ar.results,
        vec![
            result(
                "auth",
                "pass",
                vec![Property::new("smtp", "auth", "sender@example.net")]
            ),
            result(
                "spf",
                "pass",
                vec![Property::new("smtp", "mailfrom", "example.net")]
            ),
        ]
    );

    let ar = parse("example.com; iprev=pass\r\n          policy.iprev=192.0.2.200").unwrap();
    assert_eq!(
        ar.results,
        vec![result(
            "iprev",
            "pass",
            vec![Property::new("policy", "iprev", "192.0.2.200")]
        )]
    );
}

/// RFC 7601 Appendix B.5
#[test]
fn test_rfc_b5_sender_id_and_dkim() {
    let ar = parse(concat!(
        "example.com;\r\n",
        "          sender-id=pass header.from=example.com"
    ))
    .unwrap();
    assert_eq!(
        ar.results,
        vec![result(
            "sender-id",
            "pass",
            vec![Property::new("header", "from", "example.com")]
        )]
    );

    let ar = parse(concat!(
        "example.com;\r\n",
        "          dkim=pass (good signature) header.d=example.com"
    ))
    .unwrap();
    assert_eq!(ar.results[0].property("header", "d").unwrap().value, "example.com");
}

/// RFC 7601 Appendix B.6
#[test]
fn test_rfc_b6_multiple_signatures() {
    let ar = parse(concat!(
        "example.com;\r\n",
        "          dkim=pass reason=\"good signature\"\r\n",
        "            header.i=@mail-router.example.net;\r\n",
        "          dkim=fail reason=\"bad signature\"\r\n",
        "            header.i=@newyork.example.com"
    ))
    .unwrap();

    let expected = vec![
        AuthenticationResult {
            reason: Some("good signature".to_string()),
            ..result(
                "dkim",
                "pass",
                vec![Property::new("header", "i", "@mail-router.example.net")],
            )
        },
        AuthenticationResult {
            reason: Some("bad signature".to_string()),
            ..result(
                "dkim",
                "fail",
                vec![Property::new("header", "i", "@newyork.example.com")],
            )
        },
    ];
    assert_eq!(ar.results, expected);
}

/// RFC 7601 Appendix B.7
#[test]
fn test_rfc_b7_comment_heavy() {
    let ar = parse(concat!(
        "foo.example.net (foobar) 1 (baz);\r\n",
        "    dkim (Because I like it) / 1 (One yay) = (wait for it) fail\r\n",
        "      policy (A dot can go here) . (like that) expired\r\n",
        "      (this surprised me) = (as I wasn't expecting it) 1362471462"
    ))
    .unwrap();

    assert_eq!(ar.authserv_id, "foo.example.net");
    assert_eq!(ar.version.as_deref(), Some("1"));
    assert_eq!(
        ar.results,
        vec![AuthenticationResult {
            version: Some("1".to_string()),
            ..result(
                "dkim",
                "fail",
                vec![Property::new("policy", "expired", "1362471462")],
            )
        }]
    );
}

#[test]
fn test_dmarc_policy_engine_view() {
    let ar: AuthenticationResults = concat!(
        "mx.example.org;\n",
        "\tspf=pass smtp.mailfrom=bounce.example.com;\n",
        "\tdkim=pass header.d=example.com header.s=sel1 header.b=abcd1234;\n",
        "\tdkim=fail reason=\"body hash mismatch\" header.d=relay.example.net;\n",
        "\tdmarc=pass (p=reject) header.from=example.com"
    )
    .parse()
    .unwrap();

    let passing_dkim: Vec<_> = ar
        .results_for("dkim")
        .filter(|r| r.result == "pass")
        .filter_map(|r| r.property("header", "d"))
        .map(|p| p.value.as_str())
        .collect();
    assert_eq!(passing_dkim, vec!["example.com"]);

    let dmarc = ar.results_for("DMARC").next().unwrap();
    assert_eq!(dmarc.result, "pass");
    assert_eq!(
        dmarc.properties_of(PropertyType::Header).count(),
        1,
        "the comment is not a property"
    );
}

#[test]
fn test_internationalized_values() {
    let ar = parse("mx.例え.jp; dkim=pass header.d=bücher.example header.i=@bücher.example")
        .unwrap();
    assert_eq!(ar.authserv_id, "mx.例え.jp");
    assert_eq!(ar.results[0].properties[0].value, "bücher.example");
    assert_eq!(ar.results[0].properties[1].value, "@bücher.example");
}

#[test]
fn test_invalid_utf8_is_fatal() {
    let err = parse_bytes(b"example.com; spf=pass (caf\xe9) smtp.mailfrom=example.net").unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::InvalidEncoding);
    assert_eq!(err.position(), 26);
}

#[test]
fn test_unknown_ptype_rejected_by_default() {
    let input = "example.com; spf=pass x-vendor.score=3";
    let err = parse(input).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::InvalidPType("x-vendor".to_string()));

    let lenient = Parser::new(
        ParseOptions::builder()
            .ptype_policy(PropertyTypePolicy::Any)
            .build(),
    );
    let ar = lenient.parse(input).unwrap();
    assert_eq!(ar.results[0].properties, vec![Property::new("x-vendor", "score", "3")]);
}

#[test]
fn test_no_partial_results_on_error() {
    let err = parse("example.com; spf=pass smtp.mailfrom=example.net; dkim=").unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::ResultMissing);
}

#[test]
fn test_idempotent() {
    let input = "example.com; dkim=pass (good signature) header.d=mail-router.example.net";
    assert_eq!(parse(input).unwrap(), parse(input).unwrap());
}

#[cfg(feature = "serde")]
#[test]
fn test_serde_round_trip() {
    let ar = parse("example.com; spf=pass smtp.mailfrom=example.net").unwrap();
    let json = serde_json::to_value(&ar).unwrap();
    assert_eq!(json["authserv_id"], "example.com");
    assert_eq!(json["results"][0]["properties"][0]["value"], "example.net");
    let back: AuthenticationResults = serde_json::from_value(json).unwrap();
    assert_eq!(back, ar);
}
