//! Status enums are stored as their lowercase names in `VARCHAR` columns.

use std::io::Write;

use diesel::deserialize::{self, FromSql};
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;

use crate::domain::status::{ItemStatus, OrderStatus, TableStatus};

macro_rules! text_status_sql {
    ($($ty:ident),+) => {
        $(
            impl ToSql<Text, Pg> for $ty {
                fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
                    out.write_all(self.as_str().as_bytes())?;
                    Ok(IsNull::No)
                }
            }

            impl FromSql<Text, Pg> for $ty {
                fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
                    let raw = std::str::from_utf8(bytes.as_bytes())?;
                    raw.parse().map_err(|_| {
                        format!("unrecognized {} value `{}`", stringify!($ty), raw).into()
                    })
                }
            }
        )+
    };
}

text_status_sql!(TableStatus, OrderStatus, ItemStatus);
