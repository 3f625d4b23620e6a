use std::io;

use word_to_pdf::cli::process_args;

fn main() -> io::Result<()> {
    let output_dir = process_args()?;
    log::info!("程式執行完成，輸出目錄：{}", output_dir);
    Ok(())
}
