//! Parses an Authentication-Results value given on the command line.
//!
//! ```text
//! RUST_LOG=mailledger_authres=trace cargo run --example parse_header -- \
//!     "example.com; spf=pass smtp.mailfrom=example.net"
//! ```

use mailledger_authres::{ParseOptions, Parser, PropertyTypePolicy};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let Some(value) = std::env::args().nth(1) else {
        eprintln!("usage: parse_header <header-value>");
        std::process::exit(2);
    };

    let parser = Parser::new(
        ParseOptions::builder()
            .ptype_policy(PropertyTypePolicy::Registered)
            .build(),
    );

    match parser.parse(&value) {
        Ok(ar) => {
            println!("authserv-id: {}", ar.authserv_id);
            if let Some(version) = &ar.version {
                println!("version: {version}");
            }
            for result in &ar.results {
                print!("{}", result.method);
                if let Some(version) = &result.version {
                    print!("/{version}");
                }
                println!(" = {}", result.result);
                if let Some(reason) = &result.reason {
                    println!("  reason: {reason}");
                }
                for p in &result.properties {
                    println!("  {}.{} = {}", p.ptype, p.name, p.value);
                }
            }
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
