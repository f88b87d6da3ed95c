//! CSV report building.
//!
//! The dashboard's export button built a CSV blob client-side; here the
//! document is assembled server-side and returned as a download. One header
//! row plus one row per transaction, monetary fields formatted as major
//! units with exactly two decimal places.

use crate::models::transaction::Transaction;

const CSV_HEADER: &str =
    "transaction_id,order_id,created_at,amount,fee,tax,net,payment_method,status";

/// Format paise as major units with exactly two decimals: 123456 → "1234.56".
pub fn format_paise(paise: i64) -> String {
    let sign = if paise < 0 { "-" } else { "" };
    let paise = paise.abs();
    format!("{sign}{}.{:02}", paise / 100, paise % 100)
}

/// Quote a CSV field only when it contains a delimiter, quote or newline.
fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Build the transactions CSV: header plus one line per transaction.
pub fn transactions_csv(transactions: &[Transaction]) -> String {
    let mut out = String::with_capacity(64 * (transactions.len() + 1));
    out.push_str(CSV_HEADER);
    out.push('\n');
    for t in transactions {
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{},{}\n",
            t.id,
            csv_escape(&t.order_id),
            t.created_at.to_rfc3339(),
            format_paise(t.amount_paise),
            format_paise(t.fee_paise),
            format_paise(t.tax_paise),
            format_paise(t.net_paise),
            csv_escape(&t.payment_method),
            csv_escape(&t.status),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn transaction(order_id: &str, amount_paise: i64) -> Transaction {
        let now = Utc::now();
        Transaction {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            order_id: order_id.to_string(),
            customer_email: None,
            customer_phone: None,
            amount_paise,
            fee_paise: amount_paise * 200 / 10_000,
            tax_paise: amount_paise * 200 / 10_000 * 1800 / 10_000,
            net_paise: 0,
            refunded_paise: 0,
            currency: "INR".to_string(),
            payment_method: "upi".to_string(),
            status: "success".to_string(),
            settlement_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_format_paise_two_decimals() {
        assert_eq!(format_paise(123_456), "1234.56");
        assert_eq!(format_paise(100), "1.00");
        assert_eq!(format_paise(5), "0.05");
        assert_eq!(format_paise(0), "0.00");
        assert_eq!(format_paise(-150), "-1.50");
        assert_eq!(format_paise(-5), "-0.05");
    }

    #[test]
    fn test_csv_has_header_plus_one_line_per_transaction() {
        let rows: Vec<Transaction> = (0..5)
            .map(|i| transaction(&format!("ORD-{i}"), 10_000 * (i + 1)))
            .collect();
        let csv = transactions_csv(&rows);
        assert_eq!(csv.lines().count(), 6);
        assert!(csv.starts_with("transaction_id,order_id,"));
    }

    #[test]
    fn test_empty_export_is_just_the_header() {
        let csv = transactions_csv(&[]);
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn test_monetary_fields_have_two_decimals() {
        let csv = transactions_csv(&[transaction("ORD-1", 123_456)]);
        let row = csv.lines().nth(1).unwrap();
        let fields: Vec<&str> = row.split(',').collect();
        // amount, fee, tax, net
        for field in &fields[3..7] {
            let (_, decimals) = field.rsplit_once('.').unwrap();
            assert_eq!(decimals.len(), 2, "field {field} lacks two decimals");
        }
        assert_eq!(fields[3], "1234.56");
    }

    #[test]
    fn test_fields_with_commas_are_quoted() {
        let mut t = transaction("ORD-1,rev", 10_000);
        t.payment_method = "card \"gold\"".to_string();
        let csv = transactions_csv(&[t]);
        let row = csv.lines().nth(1).unwrap();
        assert!(row.contains("\"ORD-1,rev\""));
        assert!(row.contains("\"card \"\"gold\"\"\""));
    }
}
