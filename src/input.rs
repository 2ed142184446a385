use crate::error::{InputError, Table};
use crate::types::{DemandItem, StockItem};

fn parse_field(
    text: &str,
    table: Table,
    row: usize,
    field: &'static str,
) -> Result<i64, InputError> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| InputError::NotAnInteger {
            table,
            row,
            field,
            text: text.trim().to_string(),
        })
}

/// Checks one `(length, quantity)` row and narrows it to `u32`.
pub fn check_row(table: Table, row: usize, length: i64, quantity: i64) -> Result<(u32, u32), InputError> {
    if length <= 0 {
        return Err(InputError::NonPositiveLength {
            table,
            row,
            value: length,
        });
    }
    if quantity < 0 {
        return Err(InputError::NegativeQuantity {
            table,
            row,
            value: quantity,
        });
    }
    let length = u32::try_from(length).map_err(|_| InputError::OutOfRange {
        table,
        row,
        field: "length",
        value: length,
    })?;
    let quantity = u32::try_from(quantity).map_err(|_| InputError::OutOfRange {
        table,
        row,
        field: "quantity",
        value: quantity,
    })?;
    Ok((length, quantity))
}

pub fn parse_item(s: &str, table: Table, row: usize) -> Result<(u32, u32), InputError> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 2 {
        return Err(InputError::Malformed {
            table,
            row,
            text: s.to_string(),
        });
    }
    let length = parse_field(parts[0], table, row, "length")?;
    let quantity = parse_field(parts[1], table, row, "quantity")?;
    check_row(table, row, length, quantity)
}

/// Parses a two-column `Length,Quantity` table.
///
/// Cells may be separated by commas, semicolons, tabs or spaces. Blank lines
/// and a leading header line are skipped. Row numbers in errors count every
/// line of `text`, starting at 1.
pub fn parse_table(text: &str, table: Table) -> Result<Vec<(u32, u32)>, InputError> {
    let mut rows = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let row = idx + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let cells: Vec<&str> = line
            .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
            .filter(|c| !c.is_empty())
            .collect();
        if rows.is_empty() && is_header(&cells) {
            continue;
        }
        if cells.len() != 2 {
            return Err(InputError::Malformed {
                table,
                row,
                text: line.to_string(),
            });
        }
        let length = parse_field(cells[0], table, row, "length")?;
        let quantity = parse_field(cells[1], table, row, "quantity")?;
        rows.push(check_row(table, row, length, quantity)?);
    }
    Ok(rows)
}

fn is_header(cells: &[&str]) -> bool {
    cells.len() == 2
        && cells[0].eq_ignore_ascii_case("length")
        && cells[1].eq_ignore_ascii_case("quantity")
}

pub fn parse_stock_table(text: &str) -> Result<Vec<StockItem>, InputError> {
    Ok(parse_table(text, Table::Stock)?
        .into_iter()
        .map(|(length, quantity)| StockItem::new(length, quantity))
        .collect())
}

pub fn parse_demand_table(text: &str) -> Result<Vec<DemandItem>, InputError> {
    Ok(parse_table(text, Table::Demand)?
        .into_iter()
        .map(|(length, quantity)| DemandItem::new(length, quantity))
        .collect())
}

/// Rejects zero lengths in already-typed input.
pub fn validate(stock: &[StockItem], demands: &[DemandItem]) -> Result<(), InputError> {
    for (i, s) in stock.iter().enumerate() {
        check_row(Table::Stock, i + 1, s.length as i64, s.quantity as i64)?;
    }
    for (i, d) in demands.iter().enumerate() {
        check_row(Table::Demand, i + 1, d.length as i64, d.quantity as i64)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_item() {
        assert_eq!(parse_item("6000:148", Table::Stock, 1), Ok((6000, 148)));
        assert_eq!(parse_item(" 2465 : 0 ", Table::Demand, 1), Ok((2465, 0)));
    }

    #[test]
    fn test_parse_item_errors() {
        assert_eq!(
            parse_item("6000", Table::Stock, 2),
            Err(InputError::Malformed {
                table: Table::Stock,
                row: 2,
                text: "6000".to_string(),
            })
        );
        assert_eq!(
            parse_item("6000:abc", Table::Stock, 1),
            Err(InputError::NotAnInteger {
                table: Table::Stock,
                row: 1,
                field: "quantity",
                text: "abc".to_string(),
            })
        );
        assert_eq!(
            parse_item("0:3", Table::Demand, 4),
            Err(InputError::NonPositiveLength {
                table: Table::Demand,
                row: 4,
                value: 0,
            })
        );
        assert_eq!(
            parse_item("100:-3", Table::Demand, 1),
            Err(InputError::NegativeQuantity {
                table: Table::Demand,
                row: 1,
                value: -3,
            })
        );
        assert!(matches!(
            parse_item("5000000000:1", Table::Stock, 1),
            Err(InputError::OutOfRange { field: "length", .. })
        ));
    }

    #[test]
    fn test_parse_table_with_header_and_blanks() {
        let text = "Length,Quantity\n6000,148\n\n5400;30\n5000\t30\n";
        let stock = parse_stock_table(text).unwrap();
        assert_eq!(
            stock,
            vec![
                StockItem::new(6000, 148),
                StockItem::new(5400, 30),
                StockItem::new(5000, 30),
            ]
        );
    }

    #[test]
    fn test_parse_table_reports_row() {
        let err = parse_demand_table("2465,45\n2215,x\n").unwrap_err();
        assert_eq!(
            err,
            InputError::NotAnInteger {
                table: Table::Demand,
                row: 2,
                field: "quantity",
                text: "x".to_string(),
            }
        );
        assert_eq!(
            err.to_string(),
            "demand row 2: quantity 'x' is not an integer"
        );

        let err = parse_demand_table("2465,45,1\n").unwrap_err();
        assert!(matches!(err, InputError::Malformed { row: 1, .. }));
    }

    #[test]
    fn test_validate() {
        assert!(validate(&[StockItem::new(6000, 0)], &[DemandItem::new(1, 1)]).is_ok());
        assert_eq!(
            validate(&[StockItem::new(6000, 1)], &[DemandItem::new(0, 1)]),
            Err(InputError::NonPositiveLength {
                table: Table::Demand,
                row: 1,
                value: 0,
            })
        );
    }
}
