use colored::Colorize;
use derive_more::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum OutputStream {
    #[display("stdout")]
    Stdout,
    #[display("stderr")]
    Stderr,
}

/// Turns colored output off when stdout is not a color-capable terminal.
pub fn configure_colors() {
    if supports_color::on(supports_color::Stream::Stdout).is_none() {
        colored::control::set_override(false);
    }
}

pub fn format_contract_line(contract: &str, stream: OutputStream, line: &str) -> String {
    let prefix = match stream {
        OutputStream::Stdout => format!("[{contract}]").cyan(),
        OutputStream::Stderr => format!("[{contract}]").red(),
    };
    format!("{prefix} {line}")
}

pub fn print_from_contract(contract: &str, stream: OutputStream, line: &str) {
    let formatted = format_contract_line(contract, stream, line);
    match stream {
        OutputStream::Stdout => println!("{formatted}"),
        OutputStream::Stderr => eprintln!("{formatted}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_is_prefixed_with_contract_name() {
        colored::control::set_override(false);
        assert_eq!(
            format_contract_line("contracts/hello.slang", OutputStream::Stdout, "hello"),
            "[contracts/hello.slang] hello"
        );
        assert_eq!(
            format_contract_line("c", OutputStream::Stderr, "boom"),
            "[c] boom"
        );
    }
}
