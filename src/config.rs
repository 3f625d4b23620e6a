use clap::Parser;
use std::io;
use std::path::Path;

#[derive(Parser)]
#[command(
    name = "word_to_pdf",
    about = "將 Word 系列文件批次轉換為 PDF",
    long_about = "遞迴掃描輸入目錄下的 Word 系列文件（.doc、.docx、.docm、.dotx、.dotm、.odt、.rtf），\n透過本機安裝的 LibreOffice 逐一轉換為 PDF，並在輸出目錄下鏡像原始目錄結構。\n所有操作都在互動介面中確認；命令列引數只用來預填提示與調整顯示。"
)]
pub struct Cli {
    /// 輸入目錄，省略時以互動方式詢問
    #[arg(short, long)]
    pub input: Option<String>,
    /// 輸出目錄，省略時預設為「<輸入目錄>_PDF」
    #[arg(short, long)]
    pub output: Option<String>,
    #[arg(long, default_value_t = false)]
    pub no_progress: bool,
    #[arg(long, default_value = "info", value_parser = ["info", "warn", "error"])]
    pub log_level: String,
}

pub fn validate_input_path(input: &str) -> io::Result<&Path> {
    let path = Path::new(input);
    if !path.is_dir() {
        log::error!("輸入目錄不存在：{}", input);
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("輸入目錄 '{}' 不存在", input),
        ));
    }
    Ok(path)
}
