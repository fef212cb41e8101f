//! Error types.

use crate::common::*;

error_chain! {
    types {
        Error, ErrorKind, ResultExt, Res;
    }

    foreign_links {
        Io(::std::io::Error) #[doc = "IO error."];
    }

    errors {
        #[doc = "A rule set was queried for its stratification before being closed."]
        NotClosed {
            description("rule set is not closed")
            display("rule set is not closed (stratification not computed)")
        }
        #[doc = "Model lifting failed."]
        Lift(msg: String) {
            description("model lifting error")
            display("model lifting error: {}", msg)
        }
    }
}

/// Prints an error.
pub fn print_err(errs: &Error) {
    println!("({}", conf.bad("error"));
    for err in errs.iter() {
        for line in format!("{}", err).lines() {
            println!("  {}", line)
        }
    }
    println!(")")
}
