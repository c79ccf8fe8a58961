use anyhow::Result;
use enum_dispatch::enum_dispatch;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::io::Write;

/// Trait to define different output generators. Defines two functions,
/// `format` which generates a serialized string of the `DataFrame` and
/// `save` which writes it to the given writer.
#[enum_dispatch]
pub trait OutputGenerator {
    fn save(&self, writer: &mut impl Write, df: &mut DataFrame) -> Result<()>;
    fn format(&self, df: &mut DataFrame) -> Result<String> {
        // Just creating an empty vec to store the buffered output
        let mut data: Vec<u8> = vec![];
        let mut buff = Cursor::new(&mut data);
        self.save(&mut buff, df)?;

        Ok(String::from_utf8(data)?)
    }
}

/// Enum of OutputFormatters, one for each potential output type
#[enum_dispatch(OutputGenerator)]
#[derive(Serialize, Deserialize, Debug)]
pub enum OutputFormatter {
    Csv(CSVFormatter),
}

/// Format a result table as a CSV file.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct CSVFormatter;

impl OutputGenerator for CSVFormatter {
    fn save(&self, writer: &mut impl Write, df: &mut DataFrame) -> Result<()> {
        CsvWriter::new(writer).finish(df)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_formatter_headers_and_rows() {
        let mut df = df![
            "PUMA" => [3301i64, 506],
            "All occupied housing units" => [1200.0, 800.0],
        ]
        .unwrap();
        let output = CSVFormatter.format(&mut df).unwrap();
        let mut lines = output.lines();
        assert_eq!(
            lines.next().unwrap(),
            "PUMA,All occupied housing units"
        );
        assert_eq!(lines.next().unwrap(), "3301,1200.0");
        assert_eq!(lines.next().unwrap(), "506,800.0");
    }
}
