use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: i64,
    pub store_code: String,
    pub name: String,
    pub banner: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub address: Option<String>,
    pub surface_m2: Option<f64>,
    pub monthly_rent: Option<f64>,
    pub status: String,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
    pub closed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoreRequest {
    pub store_code: String,
    pub name: String,
    pub banner: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub address: Option<String>,
    pub surface_m2: Option<f64>,
    pub monthly_rent: Option<f64>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStoreRequest {
    pub name: Option<String>,
    pub banner: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub address: Option<String>,
    pub surface_m2: Option<f64>,
    pub monthly_rent: Option<f64>,
    pub status: Option<String>,
    pub user_id: Option<i64>,
}

fn row_to_store(row: &Row) -> rusqlite::Result<Store> {
    Ok(Store {
        id: row.get("id")?,
        store_code: row.get("store_code")?,
        name: row.get("name")?,
        banner: row.get("banner")?,
        city: row.get("city")?,
        region: row.get("region")?,
        address: row.get("address")?,
        surface_m2: row.get("surface_m2")?,
        monthly_rent: row.get("monthly_rent")?,
        status: row.get("status")?,
        created_by: row.get("created_by")?,
        updated_by: row.get("updated_by")?,
        closed_at: row.get("closed_at")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub fn find_all(conn: &Connection) -> anyhow::Result<Vec<Store>> {
    let mut stmt = conn.prepare("SELECT * FROM stores ORDER BY store_code")?;
    let rows = stmt.query_map([], row_to_store)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn find_by_id(conn: &Connection, id: i64) -> anyhow::Result<Option<Store>> {
    let mut stmt = conn.prepare("SELECT * FROM stores WHERE id = ?")?;
    let mut rows = stmt.query_map(params![id], row_to_store)?;
    Ok(rows.next().transpose()?)
}

pub fn find_by_code(conn: &Connection, store_code: &str) -> anyhow::Result<Option<Store>> {
    let mut stmt = conn.prepare("SELECT * FROM stores WHERE store_code = ?")?;
    let mut rows = stmt.query_map(params![store_code], row_to_store)?;
    Ok(rows.next().transpose()?)
}

pub fn create(conn: &Connection, data: &CreateStoreRequest) -> anyhow::Result<Store> {
    conn.execute(
        "INSERT INTO stores (store_code, name, banner, city, region, address, surface_m2,
                             monthly_rent, created_by, updated_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
        params![
            data.store_code,
            data.name,
            data.banner,
            data.city,
            data.region,
            data.address,
            data.surface_m2,
            data.monthly_rent,
            data.user_id,
        ],
    )?;
    let id = conn.last_insert_rowid();
    find_by_id(conn, id)?.ok_or_else(|| anyhow::anyhow!("Failed to retrieve created store"))
}

pub fn update(conn: &Connection, id: i64, data: &UpdateStoreRequest) -> anyhow::Result<Option<Store>> {
    if find_by_id(conn, id)?.is_none() {
        return Ok(None);
    }

    let mut sets = Vec::new();
    let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    if let Some(ref name) = data.name {
        sets.push("name = ?");
        values.push(Box::new(name.clone()));
    }
    if let Some(ref banner) = data.banner {
        sets.push("banner = ?");
        values.push(Box::new(banner.clone()));
    }
    if let Some(ref city) = data.city {
        sets.push("city = ?");
        values.push(Box::new(city.clone()));
    }
    if let Some(ref region) = data.region {
        sets.push("region = ?");
        values.push(Box::new(region.clone()));
    }
    if let Some(ref address) = data.address {
        sets.push("address = ?");
        values.push(Box::new(address.clone()));
    }
    if let Some(surface) = data.surface_m2 {
        sets.push("surface_m2 = ?");
        values.push(Box::new(surface));
    }
    if let Some(rent) = data.monthly_rent {
        sets.push("monthly_rent = ?");
        values.push(Box::new(rent));
    }
    if let Some(ref status) = data.status {
        sets.push("status = ?");
        values.push(Box::new(status.clone()));
        sets.push(if status == "closed" {
            "closed_at = datetime('now')"
        } else {
            "closed_at = NULL"
        });
    }
    if let Some(user_id) = data.user_id {
        sets.push("updated_by = ?");
        values.push(Box::new(user_id));
    }

    sets.push("updated_at = datetime('now')");
    values.push(Box::new(id));

    let sql = format!("UPDATE stores SET {} WHERE id = ?", sets.join(", "));
    let params: Vec<&dyn rusqlite::types::ToSql> = values.iter().map(|v| v.as_ref()).collect();
    conn.execute(&sql, params.as_slice())?;
    find_by_id(conn, id)
}

pub fn delete(conn: &Connection, id: i64) -> anyhow::Result<bool> {
    let changes = conn.execute("DELETE FROM stores WHERE id = ?", params![id])?;
    Ok(changes > 0)
}
