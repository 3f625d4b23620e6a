use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use log::{debug, info, warn};

/// 轉換器介面，讓執行迴圈不必依賴實際安裝的 LibreOffice。
pub trait DocumentConverter {
    /// 將 `src` 轉存為 PDF 至 `dest`。`dest` 的上層目錄必須已存在。
    fn convert(&mut self, src: &Path, dest: &Path) -> io::Result<()>;
}

struct Ready {
    binary: PathBuf,
    profile_dir: PathBuf,
}

/// 外部文書處理程式（LibreOffice）的明確持有控制代碼。
///
/// 首次使用時才尋找 `soffice` 執行檔並建立專用的使用者設定檔目錄，
/// 之後的呼叫重複使用同一份狀態；整個程序只需要一個實例。
/// 轉換失敗後不會重建控制代碼，假設程式仍可處理下一個檔案。
pub struct SofficeConverter {
    ready: Option<Ready>,
}

impl SofficeConverter {
    pub fn new() -> Self {
        SofficeConverter { ready: None }
    }

    /// 冪等的初始化：尋找執行檔（可用 `SOFFICE_PATH` 覆寫）並建立
    /// 設定檔目錄。已就緒時直接回傳。
    pub fn ensure_ready(&mut self) -> io::Result<()> {
        if self.ready.is_some() {
            return Ok(());
        }
        let binary = match std::env::var_os("SOFFICE_PATH") {
            Some(path) => PathBuf::from(path),
            None => which::which("soffice").map_err(|e| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("找不到 LibreOffice（soffice）：{}", e),
                )
            })?,
        };
        let profile_dir =
            std::env::temp_dir().join(format!("word_to_pdf-profile-{}", std::process::id()));
        fs::create_dir_all(&profile_dir)?;
        info!("外部轉換程式就緒：{}", binary.display());
        self.ready = Some(Ready {
            binary,
            profile_dir,
        });
        Ok(())
    }

    /// 丟棄控制代碼並刪除設定檔目錄，讓測試能在多次執行之間清理。
    pub fn shutdown(&mut self) {
        if let Some(ready) = self.ready.take() {
            if let Err(e) = fs::remove_dir_all(&ready.profile_dir) {
                warn!("刪除設定檔目錄 {} 失敗：{}", ready.profile_dir.display(), e);
            }
        }
    }
}

impl Default for SofficeConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentConverter for SofficeConverter {
    fn convert(&mut self, src: &Path, dest: &Path) -> io::Result<()> {
        self.ensure_ready()?;
        let ready = match self.ready.as_ref() {
            Some(r) => r,
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    "外部轉換程式尚未初始化",
                ))
            }
        };
        let outdir = dest.parent().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("輸出路徑 {} 沒有上層目錄", dest.display()),
            )
        })?;

        // 專用設定檔避免與使用者自己開啟的 LibreOffice 實例互搶。
        let profile = format!("-env:UserInstallation=file://{}", ready.profile_dir.display());
        debug!("soffice 轉換：{} -> {}", src.display(), dest.display());
        let output = Command::new(&ready.binary)
            .arg(&profile)
            .args(["--headless", "--norestore", "--convert-to", "pdf", "--outdir"])
            .arg(outdir)
            .arg(src)
            .output()?;

        if !output.status.success() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!(
                    "soffice 結束碼 {}：{}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }
        // soffice 轉換失敗時仍可能回傳 0，必須確認輸出檔案存在。
        if !dest.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!(
                    "soffice 未產生輸出檔案：{}",
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shutdown_before_first_use_is_a_no_op() {
        let mut converter = SofficeConverter::new();
        converter.shutdown();
        assert!(converter.ready.is_none());
    }

    #[test]
    fn ensure_ready_creates_profile_and_shutdown_removes_it() {
        let dir = tempfile::tempdir().unwrap();
        let fake_binary = dir.path().join("soffice");
        std::fs::write(&fake_binary, b"#!/bin/sh\n").unwrap();
        std::env::set_var("SOFFICE_PATH", &fake_binary);

        let mut converter = SofficeConverter::new();
        converter.ensure_ready().unwrap();
        let profile_dir = converter.ready.as_ref().unwrap().profile_dir.clone();
        assert!(profile_dir.is_dir());

        // 再次呼叫必須重複使用同一份狀態
        converter.ensure_ready().unwrap();
        assert_eq!(converter.ready.as_ref().unwrap().profile_dir, profile_dir);

        converter.shutdown();
        assert!(!profile_dir.exists());
        std::env::remove_var("SOFFICE_PATH");
    }
}
