//! SQLite-backed transaction log.
//!
//! Append-only apart from `undo_last`. Holdings are derived on read; the
//! store never validates business rules (oversells are rejected at the
//! command layer before a row is written).

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, params};
use uuid::Uuid;

use crate::types::TxKind;

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub coin_id: u32,
    pub symbol: String,
    pub kind: TxKind,
    pub quantity: f64,
    pub price_usd: f64,
    // UTC epoch seconds
    pub created_at: i64,
}

impl Transaction {
    pub fn new(kind: TxKind, coin_id: u32, symbol: &str, quantity: f64, price_usd: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            coin_id,
            symbol: symbol.to_string(),
            kind,
            quantity,
            price_usd,
            created_at: Utc::now().timestamp(),
        }
    }
}

/// Net position in one coin, aggregated from the log.
#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub coin_id: u32,
    pub symbol: String,
    /// Buys minus sells. Holdings with nothing left are filtered out.
    pub quantity: f64,
    /// Average unit price across buys, `None` if the log somehow has only
    /// sells for this coin.
    pub avg_buy_price: Option<f64>,
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS transactions (
    id         TEXT PRIMARY KEY,
    coin_id    INTEGER NOT NULL,
    symbol     TEXT NOT NULL,
    kind       TEXT NOT NULL,
    quantity   REAL NOT NULL,
    price_usd  REAL NOT NULL,
    created_at INTEGER NOT NULL
);
";

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &str) -> Result<Store> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open transaction db at {path}"))?;
        conn.execute_batch(SCHEMA)?;
        Ok(Store { conn })
    }

    pub fn open_in_memory() -> Result<Store> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Store { conn })
    }

    pub fn record(&self, tx: &Transaction) -> Result<()> {
        self.conn.execute(
            "INSERT INTO transactions (id, coin_id, symbol, kind, quantity, price_usd, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                tx.id.to_string(),
                tx.coin_id,
                tx.symbol,
                tx.kind.as_str(),
                tx.quantity,
                tx.price_usd,
                tx.created_at,
            ],
        )?;
        Ok(())
    }

    /// Delete the most recent transaction and return it. `None` when the
    /// log is empty.
    pub fn undo_last(&self) -> Result<Option<Transaction>> {
        let last = {
            let mut stmt = self.conn.prepare(
                "SELECT id, coin_id, symbol, kind, quantity, price_usd, created_at
                 FROM transactions ORDER BY created_at DESC, rowid DESC LIMIT 1",
            )?;
            let mut rows = stmt.query([])?;
            match rows.next()? {
                Some(row) => Some(row_to_tx(row)?),
                None => None,
            }
        };

        if let Some(tx) = &last {
            self.conn.execute(
                "DELETE FROM transactions WHERE id = ?1",
                params![tx.id.to_string()],
            )?;
        }
        Ok(last)
    }

    /// Full history, newest first.
    pub fn transactions(&self) -> Result<Vec<Transaction>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, coin_id, symbol, kind, quantity, price_usd, created_at
             FROM transactions ORDER BY created_at DESC, rowid DESC",
        )?;
        let mut out = Vec::new();
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            out.push(row_to_tx(row)?);
        }
        Ok(out)
    }

    /// Per-coin net positions. Coins that were fully sold off are dropped.
    pub fn holdings(&self) -> Result<Vec<Holding>> {
        let mut stmt = self.conn.prepare(
            "SELECT coin_id, symbol,
                    SUM(CASE WHEN kind = 'buy' THEN quantity ELSE -quantity END) AS net_qty,
                    SUM(CASE WHEN kind = 'buy' THEN quantity * price_usd ELSE 0 END) AS buy_cost,
                    SUM(CASE WHEN kind = 'buy' THEN quantity ELSE 0 END) AS buy_qty
             FROM transactions
             GROUP BY coin_id
             ORDER BY coin_id",
        )?;

        let mut out = Vec::new();
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let quantity: f64 = row.get(2)?;
            if quantity <= 0.0 {
                continue;
            }
            let buy_cost: f64 = row.get(3)?;
            let buy_qty: f64 = row.get(4)?;
            out.push(Holding {
                coin_id: row.get(0)?,
                symbol: row.get(1)?,
                quantity,
                avg_buy_price: if buy_qty > 0.0 {
                    Some(buy_cost / buy_qty)
                } else {
                    None
                },
            });
        }
        Ok(out)
    }

    /// Net quantity currently held in one coin (0.0 if never traded).
    pub fn position(&self, coin_id: u32) -> Result<f64> {
        let qty: Option<f64> = self.conn.query_row(
            "SELECT SUM(CASE WHEN kind = 'buy' THEN quantity ELSE -quantity END)
             FROM transactions WHERE coin_id = ?1",
            params![coin_id],
            |row| row.get(0),
        )?;
        Ok(qty.unwrap_or(0.0))
    }
}

fn row_to_tx(row: &rusqlite::Row<'_>) -> Result<Transaction> {
    let id: String = row.get(0)?;
    let kind: String = row.get(3)?;
    Ok(Transaction {
        id: Uuid::parse_str(&id).with_context(|| format!("bad tx id in db: {id}"))?,
        coin_id: row.get(1)?,
        symbol: row.get(2)?,
        kind: TxKind::parse(&kind)
            .with_context(|| format!("bad tx kind in db: {kind}"))?,
        quantity: row.get(4)?,
        price_usd: row.get(5)?,
        created_at: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buy(coin_id: u32, symbol: &str, qty: f64, price: f64) -> Transaction {
        Transaction::new(TxKind::Buy, coin_id, symbol, qty, price)
    }

    fn sell(coin_id: u32, symbol: &str, qty: f64, price: f64) -> Transaction {
        Transaction::new(TxKind::Sell, coin_id, symbol, qty, price)
    }

    #[test]
    fn record_and_list_round_trip() {
        let store = Store::open_in_memory().unwrap();
        let tx = buy(1, "BTC", 0.5, 50_000.0);
        store.record(&tx).unwrap();

        let all = store.transactions().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], tx);
    }

    #[test]
    fn holdings_net_out_buys_and_sells() {
        let store = Store::open_in_memory().unwrap();
        store.record(&buy(1, "BTC", 1.0, 40_000.0)).unwrap();
        store.record(&buy(1, "BTC", 1.0, 60_000.0)).unwrap();
        store.record(&sell(1, "BTC", 0.5, 55_000.0)).unwrap();
        store.record(&buy(2, "ETH", 10.0, 3_000.0)).unwrap();

        let holdings = store.holdings().unwrap();
        assert_eq!(holdings.len(), 2);

        let btc = &holdings[0];
        assert_eq!(btc.coin_id, 1);
        assert!((btc.quantity - 1.5).abs() < 1e-9);
        assert_eq!(btc.avg_buy_price, Some(50_000.0));

        assert_eq!(store.position(1).unwrap(), 1.5);
        assert_eq!(store.position(99).unwrap(), 0.0);
    }

    #[test]
    fn fully_sold_coin_leaves_holdings() {
        let store = Store::open_in_memory().unwrap();
        store.record(&buy(1, "BTC", 1.0, 40_000.0)).unwrap();
        store.record(&sell(1, "BTC", 1.0, 45_000.0)).unwrap();
        assert!(store.holdings().unwrap().is_empty());
    }

    #[test]
    fn undo_removes_newest_first() {
        let store = Store::open_in_memory().unwrap();
        let first = buy(1, "BTC", 1.0, 40_000.0);
        let second = sell(1, "BTC", 0.25, 42_000.0);
        store.record(&first).unwrap();
        store.record(&second).unwrap();

        // Both rows share a created_at second in tests; rowid breaks the tie.
        let undone = store.undo_last().unwrap().unwrap();
        assert_eq!(undone, second);

        let undone = store.undo_last().unwrap().unwrap();
        assert_eq!(undone, first);

        assert_eq!(store.undo_last().unwrap(), None);
        assert!(store.transactions().unwrap().is_empty());
    }
}
