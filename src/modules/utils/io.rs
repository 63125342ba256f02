use std::io::{self, BufRead, Write};

/// Helper function to read a line from stdin
pub fn read_line() -> io::Result<String> {
    read_line_from(&mut io::stdin().lock())
}

/// Read one trimmed line. A closed input is an `UnexpectedEof` error, never an empty line.
pub fn read_line_from(reader: &mut impl BufRead) -> io::Result<String> {
    let mut input = String::new();
    if reader.read_line(&mut input)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "input closed",
        ));
    }
    Ok(input.trim().to_string())
}

/// Print `label` without a newline and read the answer
pub fn prompt(label: &str) -> io::Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    read_line()
}

/// Helper function to prompt for input with confirmation
pub fn prompt_with_confirmation(prompt: &str, confirmation: &str) -> io::Result<bool> {
    println!("{}", prompt);
    print!("{} (y/n): ", confirmation);
    io::stdout().flush()?;

    let response = read_line()?.to_lowercase();

    Ok(response.is_empty() || response == "y")
}

/// Helper function to validate email format before it reaches the directory
pub fn is_valid_email(email: &str) -> bool {
    // Basic email validation
    email.contains('@')
        && email.contains('.')
        && !email.contains(' ')
        && email.chars().filter(|&c| c == '@').count() == 1
        && email.len() >= 5
}
