use colored::*;

const WIDTH: usize = 64;

pub fn header(title: &str) {
    let text = format!(" {} ", title.to_uppercase());
    let pad = WIDTH.saturating_sub(text.len()) / 2;
    let side = "═".repeat(pad);
    println!(
        "{}{}{}",
        side.bright_black(),
        text.bright_green().bold(),
        side.bright_black()
    );
}

pub fn separator() {
    println!("{}", "─".repeat(WIDTH).bright_black());
}
