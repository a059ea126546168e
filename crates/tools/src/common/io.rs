//! ファイルI/Oユーティリティ（gzip対応）

use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

const READER_BUF_CAP: usize = 64 * 1024; // 64 KiB

/// 入力を開く（`-` は stdin、`.gz` は展開して読む）
pub fn open_reader<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn BufRead>> {
    let p = path.as_ref();
    if p.to_string_lossy() == "-" {
        return Ok(Box::new(BufReader::with_capacity(READER_BUF_CAP, io::stdin())));
    }
    let f = File::open(p)?;
    if is_gz(p) {
        let dec = flate2::read::GzDecoder::new(f);
        return Ok(Box::new(BufReader::with_capacity(READER_BUF_CAP, dec)));
    }
    Ok(Box::new(BufReader::with_capacity(READER_BUF_CAP, f)))
}

fn is_gz(p: &Path) -> bool {
    p.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case("gz"))
}

/// `<dir>/<stem>.txt` または `<dir>/<stem>.txt.gz` を探す（非圧縮を優先）
pub fn find_text_input(dir: &Path, stem: &str) -> Option<PathBuf> {
    [format!("{stem}.txt"), format!("{stem}.txt.gz")]
        .into_iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
}

/// 書き込み先
///
/// gzip はフッタを書くまで壊れたままなので、書き終えたら [`OutputSink::finish`] を呼ぶ。
#[must_use = "finish() を呼ばないと gzip 出力が完結しない"]
pub enum OutputSink {
    File(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
    Stdout(io::StdoutLock<'static>),
}

impl OutputSink {
    fn inner(&mut self) -> &mut dyn Write {
        match self {
            OutputSink::File(w) => w,
            OutputSink::Gzip(w) => w,
            OutputSink::Stdout(w) => w,
        }
    }

    /// 圧縮ストリームを閉じてバッファを書き出す
    pub fn finish(self) -> io::Result<()> {
        match self {
            OutputSink::File(mut w) => w.flush(),
            OutputSink::Gzip(w) => w.finish()?.flush(),
            OutputSink::Stdout(mut w) => w.flush(),
        }
    }
}

impl Write for OutputSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner().flush()
    }
}

/// 出力を作る（`-` は stdout、`.gz` は圧縮して書く）
pub fn create_output<P: AsRef<Path>>(path: P) -> io::Result<OutputSink> {
    let p = path.as_ref();
    if p.to_string_lossy() == "-" {
        return Ok(OutputSink::Stdout(io::stdout().lock()));
    }
    let file = BufWriter::new(File::create(p)?);
    Ok(if is_gz(p) {
        OutputSink::Gzip(GzEncoder::new(file, Compression::default()))
    } else {
        OutputSink::File(file)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    #[test]
    fn test_gz_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("Wg2.txt.gz");
        let mut w = create_output(&path).unwrap();
        w.write_all(b"0.62 -0.41\n").unwrap();
        w.finish().unwrap();

        let mut text = String::new();
        open_reader(&path).unwrap().read_to_string(&mut text).unwrap();
        assert_eq!(text, "0.62 -0.41\n");
    }

    #[test]
    fn test_plain_output_is_flushed_on_finish() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("input_sample_00.txt");
        let mut w = create_output(&path).unwrap();
        assert!(matches!(w, OutputSink::File(_)));
        writeln!(w, "0.50000000").unwrap();
        writeln!(w, "-1.50000000").unwrap();
        w.finish().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "0.50000000\n-1.50000000\n");

        // 既存ファイルは上書き
        let mut w = create_output(&path).unwrap();
        w.write_all(b"0.25\n").unwrap();
        w.finish().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "0.25\n");
    }

    #[test]
    fn test_find_text_input_prefers_plain() {
        let tmp = TempDir::new().unwrap();
        assert!(find_text_input(tmp.path(), "bg2").is_none());

        std::fs::write(tmp.path().join("bg2.txt.gz"), b"").unwrap();
        assert!(find_text_input(tmp.path(), "bg2").unwrap().ends_with("bg2.txt.gz"));

        std::fs::write(tmp.path().join("bg2.txt"), b"").unwrap();
        assert!(find_text_input(tmp.path(), "bg2").unwrap().ends_with("bg2.txt"));
    }
}
