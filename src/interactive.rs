use dialoguer::{Confirm, Input, MultiSelect, Select};
use std::io;
use std::path::Path;
use std::sync::atomic::AtomicBool;

use crate::config::{validate_input_path, Cli};
use crate::convert::{execute_run, format_summary, ConversionJob};
use crate::file::{apply_selection, collect_entries, FileEntry};
use crate::soffice::SofficeConverter;
use crate::utils::open_file_browser;

pub fn process_interactive_mode(cli: &Cli) -> io::Result<String> {
    println!("=== Word 轉 PDF 工具 ===");
    let input = match &cli.input {
        Some(path) => {
            validate_input_path(path)?;
            path.clone()
        }
        None => get_input_dir()?,
    };
    let mut output = match &cli.output {
        Some(path) => path.clone(),
        None => default_output_dir(&input),
    };

    let mut entries = collect_entries(&input);
    if entries.is_empty() {
        println!("目錄 {} 下找不到可轉換的文件", input);
        return Ok(output);
    }
    println!("已找到 {} 個可轉換的文件（預設全部勾選）", entries.len());

    let mut converter = SofficeConverter::new();
    loop {
        let selected_count = entries.iter().filter(|e| e.included).count();
        println!(
            "文件共 {} 個，已勾選 {} 個；輸出目錄：{}",
            entries.len(),
            selected_count,
            output
        );
        let choice = Select::new()
            .with_prompt("選擇操作（使用方向鍵選擇，按 Enter 確認）")
            .items(&[
                "開始轉換",
                "編輯檔案選擇",
                "重新整理列表",
                "變更輸出目錄",
                "離開",
            ])
            .default(0)
            .interact()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("操作選擇失敗: {}", e)))?;

        match choice {
            0 => run_conversion(&input, &output, &entries, &mut converter, cli.no_progress)?,
            1 => edit_selection(&mut entries)?,
            2 => {
                // 重新掃描會整份重建清單，先前的勾選狀態一律重設
                entries = collect_entries(&input);
                println!("已重新整理，共 {} 個文件（勾選狀態已重設）", entries.len());
                if entries.is_empty() {
                    break;
                }
            }
            3 => output = get_output_dir(&output)?,
            _ => break,
        }
    }
    converter.shutdown();
    Ok(output)
}

fn run_conversion(
    input: &str,
    output: &str,
    entries: &[FileEntry],
    converter: &mut SofficeConverter,
    no_progress: bool,
) -> io::Result<()> {
    let job = ConversionJob::new(
        Path::new(input).to_path_buf(),
        Path::new(output).to_path_buf(),
        entries.to_vec(),
    )?;
    let cancel = AtomicBool::new(false);
    match execute_run(&job, converter, &cancel, no_progress) {
        Ok(result) => {
            println!("{}", format_summary(&result));
            if result.succeeded > 0 && confirm_open_output()? {
                if let Err(e) = open_file_browser(Path::new(output)) {
                    log::warn!("開啟輸出目錄失敗：{}", e);
                }
            }
        }
        Err(e) if e.kind() == io::ErrorKind::InvalidInput => {
            // 前置條件不滿足，提示後回到選單
            log::warn!("{}", e);
            println!("警告：{}", e);
        }
        Err(e) => return Err(e),
    }
    Ok(())
}

pub fn get_input_dir() -> io::Result<String> {
    Input::new()
        .with_prompt("請輸入文件目錄路徑（例如：./docs）")
        .validate_with(|input: &String| -> Result<(), String> {
            if Path::new(input).is_dir() {
                Ok(())
            } else {
                Err(format!("目錄 '{}' 不存在", input))
            }
        })
        .interact_text()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
}

pub fn get_output_dir(default: &str) -> io::Result<String> {
    Input::new()
        .with_prompt("輸入 PDF 輸出目錄")
        .default(default.to_string())
        .interact_text()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
}

/// 原程式在選定輸入目錄後自動帶入「<輸入目錄>_PDF」作為輸出目錄。
pub fn default_output_dir(input: &str) -> String {
    let trimmed = input.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() {
        "output_PDF".to_string()
    } else {
        format!("{}_PDF", trimmed)
    }
}

pub fn edit_selection(entries: &mut [FileEntry]) -> io::Result<()> {
    if entries.is_empty() {
        return Ok(());
    }
    let items: Vec<&str> = entries.iter().map(|e| e.display_path.as_str()).collect();
    let defaults: Vec<bool> = entries.iter().map(|e| e.included).collect();
    let selected = MultiSelect::new()
        .with_prompt("勾選要轉換的檔案（空白鍵切換，a 全選/全不選，Enter 確認）")
        .items(&items)
        .defaults(&defaults)
        .interact()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("檔案選擇失敗: {}", e)))?;
    apply_selection(entries, &selected);
    Ok(())
}

pub fn confirm_open_output() -> io::Result<bool> {
    Confirm::new()
        .with_prompt("是否開啟輸出目錄？")
        .default(true)
        .interact()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("確認輸入失敗: {}", e)))
}
