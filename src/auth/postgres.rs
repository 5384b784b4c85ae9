//! PostgreSQL-backed user store

use async_trait::async_trait;
use tokio_postgres::types::{ToSql, Type};
use tokio_postgres::{Client, NoTls, Row};

use crate::auth::models::{FieldValue, UserField, UserRecord};
use crate::auth::store::UserStore;
use crate::config::{validate_identifier, AuthConfig, Config, FieldMap};
use crate::error::{Error, Result};

type SqlParam = Box<dyn ToSql + Sync + Send>;

/// User table in a PostgreSQL database
///
/// Table and column names come from configuration and are checked against
/// `[A-Za-z0-9_]` before being placed in SQL. Values are always bound.
pub struct PostgresUserStore {
    client: Client,
    table: String,
    fields: FieldMap,
}

impl PostgresUserStore {
    /// Connect using the connection selected by `auth.db_connection`
    pub async fn connect(config: &Config) -> Result<Self> {
        let connection = config.connection()?;

        let (client, connection) = tokio_postgres::connect(&connection.url, NoTls)
            .await
            .map_err(Error::Database)?;

        // Spawn the connection handler
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("PostgreSQL connection error: {}", e);
            }
        });

        Self::from_client(client, &config.auth)
    }

    /// Wrap an already connected client
    pub fn from_client(client: Client, auth: &AuthConfig) -> Result<Self> {
        auth.validate()?;
        Ok(Self {
            client,
            table: auth.table_name.clone(),
            fields: auth.fields.clone(),
        })
    }

    fn column(&self, field: UserField) -> &str {
        self.fields.column(field)
    }

    fn select_list(&self, projection: Option<&[String]>) -> Result<String> {
        match projection {
            None => Ok("*".to_string()),
            Some(columns) => {
                for column in columns {
                    validate_identifier(column)?;
                }
                Ok(columns.join(", "))
            }
        }
    }

    async fn query_one_user(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Option<UserRecord>> {
        tracing::debug!("{}", sql);
        let row = self.client.query_opt(sql, params).await?;
        row.map(|row| self.row_to_user(&row)).transpose()
    }

    fn row_to_user(&self, row: &Row) -> Result<UserRecord> {
        let last_login = read_column(row, self.column(UserField::LastLogin))?
            .map(|v| v.parse::<i64>().unwrap_or_default())
            .unwrap_or_default();

        Ok(UserRecord {
            id: read_column(row, self.column(UserField::Id))?.unwrap_or_default(),
            login_id: read_column(row, self.column(UserField::LoginId))?.unwrap_or_default(),
            password_hash: read_column(row, self.column(UserField::Password))?.unwrap_or_default(),
            last_login,
            login_hash: read_column(row, self.column(UserField::LoginHash))?.unwrap_or_default(),
            screen_name: read_column(row, self.column(UserField::Username))?.unwrap_or_default(),
        })
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn find_by(
        &self,
        field: UserField,
        value: &str,
        projection: Option<&[String]>,
    ) -> Result<Option<UserRecord>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {}::text = $1 LIMIT 1",
            self.select_list(projection)?,
            self.table,
            self.column(field)
        );
        self.query_one_user(&sql, &[&value]).await
    }

    async fn find_by_credentials(
        &self,
        login_id: &str,
        password_hash: &str,
        projection: Option<&[String]>,
    ) -> Result<Option<UserRecord>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {}::text = $1 AND {}::text = $2 LIMIT 1",
            self.select_list(projection)?,
            self.table,
            self.column(UserField::LoginId),
            self.column(UserField::Password)
        );
        self.query_one_user(&sql, &[&login_id, &password_hash]).await
    }

    async fn update(&self, id: &str, values: &[(UserField, FieldValue)]) -> Result<()> {
        if values.is_empty() {
            return Ok(());
        }

        let assignments: Vec<String> = values
            .iter()
            .enumerate()
            .map(|(i, (field, _))| format!("{} = ${}", self.column(*field), i + 1))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE {}::text = ${}",
            self.table,
            assignments.join(", "),
            self.column(UserField::Id),
            values.len() + 1
        );
        tracing::debug!("{}", sql);

        // Bind each value as the type Postgres inferred for its column
        let statement = self.client.prepare(&sql).await?;
        let mut params: Vec<SqlParam> = Vec::with_capacity(values.len() + 1);
        for ((field, value), ty) in values.iter().zip(statement.params()) {
            params.push(to_sql_param(*field, value, ty)?);
        }
        params.push(Box::new(id.to_string()));

        let refs: Vec<&(dyn ToSql + Sync)> = params
            .iter()
            .map(|p| p.as_ref() as &(dyn ToSql + Sync))
            .collect();
        let updated = self.client.execute(&statement, &refs).await?;
        if updated == 0 {
            tracing::debug!("Update matched no user with id {}", id);
        }

        Ok(())
    }
}

/// Read a column as text; columns outside the projection read as `None`
fn read_column(row: &Row, name: &str) -> Result<Option<String>> {
    let Some(idx) = row.columns().iter().position(|c| c.name() == name) else {
        return Ok(None);
    };

    let ty = row.columns()[idx].type_().clone();
    let value = match ty {
        Type::INT2 => row.try_get::<_, Option<i16>>(idx)?.map(|v| v.to_string()),
        Type::INT4 => row.try_get::<_, Option<i32>>(idx)?.map(|v| v.to_string()),
        Type::INT8 => row.try_get::<_, Option<i64>>(idx)?.map(|v| v.to_string()),
        Type::TIMESTAMPTZ => row
            .try_get::<_, Option<chrono::DateTime<chrono::Utc>>>(idx)?
            .map(|v| v.timestamp().to_string()),
        Type::TIMESTAMP => row
            .try_get::<_, Option<chrono::NaiveDateTime>>(idx)?
            .map(|v| v.and_utc().timestamp().to_string()),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
            row.try_get::<_, Option<String>>(idx)?
        }
        other => {
            return Err(Error::Config(format!(
                "Unsupported type {} for column '{}'",
                other, name
            )))
        }
    };

    Ok(value)
}

fn to_sql_param(field: UserField, value: &FieldValue, ty: &Type) -> Result<SqlParam> {
    let text = value.to_string();
    let unsupported = || Error::Config(format!("Cannot write '{}' to {} column of type {}", text, field, ty));

    let param: SqlParam = match *ty {
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => Box::new(text.clone()),
        Type::INT8 => Box::new(text.parse::<i64>().map_err(|_| unsupported())?),
        Type::INT4 => Box::new(text.parse::<i32>().map_err(|_| unsupported())?),
        Type::TIMESTAMPTZ => {
            let secs = text.parse::<i64>().map_err(|_| unsupported())?;
            Box::new(chrono::DateTime::from_timestamp(secs, 0).ok_or_else(unsupported)?)
        }
        Type::TIMESTAMP => {
            let secs = text.parse::<i64>().map_err(|_| unsupported())?;
            Box::new(
                chrono::DateTime::from_timestamp(secs, 0)
                    .ok_or_else(unsupported)?
                    .naive_utc(),
            )
        }
        _ => return Err(unsupported()),
    };

    Ok(param)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_to_bigint_param() {
        let param = to_sql_param(UserField::LastLogin, &FieldValue::Timestamp(1000), &Type::INT8);
        assert!(param.is_ok());
    }

    #[test]
    fn test_hash_to_integer_column_rejected() {
        let param = to_sql_param(
            UserField::LoginHash,
            &FieldValue::Text("abc".to_string()),
            &Type::INT4,
        );
        assert!(matches!(param, Err(Error::Config(_))));
    }

    #[test]
    fn test_unsupported_column_type() {
        let param = to_sql_param(UserField::LoginHash, &FieldValue::Text("x".to_string()), &Type::BOOL);
        assert!(param.is_err());
    }
}
