//! Global and pass-level configuration.

use ansi_term::{Colour, Style};

/// Flags controlling the inlining pass.
///
/// Mirrors the surrounding parameter store the pass would be embedded in.
/// Passed explicitly so that different runs can use different flags.
#[derive(Debug, Clone)]
pub struct InlineConf {
    /// Activates linear chain compression.
    pub linear: bool,
    /// Allows branching (non-unique tail unifier) during linear inlining.
    pub linear_branch: bool,
    /// Activates eager inlining of unique-candidate tail atoms.
    pub eager: bool,
    /// Existentially closes unbound variables of resolved rules.
    pub fix_unbound_vars: bool,
}
impl Default for InlineConf {
    fn default() -> Self {
        InlineConf {
            linear: true,
            linear_branch: false,
            eager: true,
            fix_unbound_vars: false,
        }
    }
}

/// Hashconsing factory configuration.
///
/// Initial capacities only. Rule sets this crate rewrites are small compared
/// to a solver's term pool, a few hundred distinct terms per pass is typical,
/// so the factories start small and grow on demand.
#[derive(Debug, Clone)]
pub struct FactoryConf {
    /// Initial capacity of the term factory.
    pub term_capa: usize,
    /// Initial capacity of the predicate-argument factory.
    pub args_capa: usize,
}
impl Default for FactoryConf {
    fn default() -> Self {
        FactoryConf {
            term_capa: 1_000,
            args_capa: 100,
        }
    }
}

/// Output styles for logging.
struct Styles {
    /// Emphasis style.
    emph: Style,
    /// Happy style.
    hap: Style,
    /// Sad style.
    sad: Style,
    /// Bad style.
    bad: Style,
}
impl Styles {
    /// Constructor, with colors deactivated when not writing to a tty.
    fn new() -> Self {
        if ::atty::is(::atty::Stream::Stdout) {
            Styles {
                emph: Style::new().bold(),
                hap: Colour::Green.normal().bold(),
                sad: Colour::Yellow.normal().bold(),
                bad: Colour::Red.normal().bold(),
            }
        } else {
            Styles {
                emph: Style::new(),
                hap: Style::new(),
                sad: Style::new(),
                bad: Style::new(),
            }
        }
    }
}

/// Global configuration: verbosity, output styles and factory capacities.
pub struct Config {
    /// Verbosity level, `0` for quiet.
    pub verb: usize,
    /// Output styles.
    styles: Styles,
    /// Hashconsing factory capacities.
    pub factory: FactoryConf,
}
impl Config {
    /// Constructor.
    ///
    /// There is no command-line front-end, so the verbosity comes from the
    /// `HORNLINE_VERB` environment variable when it parses as an integer.
    pub fn new() -> Self {
        let verb = ::std::env::var("HORNLINE_VERB")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        Config {
            verb,
            styles: Styles::new(),
            factory: FactoryConf::default(),
        }
    }

    /// Emphasizes something.
    pub fn emph<S: AsRef<str>>(&self, s: S) -> String {
        format!("{}", self.styles.emph.paint(s.as_ref()))
    }
    /// Makes something happy.
    pub fn happy<S: AsRef<str>>(&self, s: S) -> String {
        format!("{}", self.styles.hap.paint(s.as_ref()))
    }
    /// Makes something sad.
    pub fn sad<S: AsRef<str>>(&self, s: S) -> String {
        format!("{}", self.styles.sad.paint(s.as_ref()))
    }
    /// Makes something bad.
    pub fn bad<S: AsRef<str>>(&self, s: S) -> String {
        format!("{}", self.styles.bad.paint(s.as_ref()))
    }
}
impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}
