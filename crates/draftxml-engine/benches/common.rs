// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2

const FRONT: &str = "\
Network Working Group                                           J. Smith
Internet-Draft                                              Example Corp
Intended status: Informational                             March 1, 2019
Expires: September 2, 2019


                      A Generated Benchmark Draft
                     draft-smith-bench-generated-00

Abstract

   This document exists to be parsed many times over.

";

/// A draft with `sections` numbered sections of prose, lists and artwork,
/// paginated every 48 lines.
#[allow(dead_code)]
pub fn generate_draft(sections: usize) -> String {
    let mut body = String::from(FRONT);
    for n in 1..=sections {
        body.push_str(&format!("{n}.  Section Number {n}\n\n"));
        body.push_str(
            "   Hosts exchange widgets as described in Section 1 and in\n   \
             [RFC2119].  Each exchange is shown in a figure below.\n\n",
        );
        body.push_str("   o  first item\n\n   o  second item with more text\n\n");
        body.push_str(&format!("{n}.1.  Details\n\n"));
        body.push_str(
            "      +--------+           +--------+\n      \
             | Sender | --------> | Recvr  |\n      \
             +--------+           +--------+\n\n",
        );
    }
    body.push_str(&format!("{}.  References\n\n", sections + 1));
    body.push_str(
        "   [RFC2119]  Bradner, S., \"Key words for use in RFCs to Indicate\n              \
         Requirement Levels\", BCP 14, RFC 2119, March 1997.\n",
    );
    paginate(&body, 48)
}

#[allow(dead_code)]
fn paginate(body: &str, page_len: usize) -> String {
    let mut out = String::new();
    for (i, chunk) in body.lines().collect::<Vec<_>>().chunks(page_len).enumerate() {
        if i > 0 {
            out.push_str("Internet-Draft            Generated Benchmark              March 2019\n\n");
        }
        for line in chunk {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str(&format!(
            "\nSmith                  Expires September 2, 2019                [Page {}]\n\x0c\n",
            i + 1
        ));
    }
    out
}
