//! Canonical retail sample context served by `/translate/context/sample`.

use super::schema_context::{
    Cardinality, ColumnMapping, SchemaContext, TableMapping, TableRelationship,
};

fn column(dax: &str, sql: &str, data_type: &str) -> ColumnMapping {
    ColumnMapping {
        dax_name: dax.to_string(),
        sql_name: sql.to_string(),
        data_type: data_type.to_string(),
    }
}

fn many_to_one(
    from_table: &str,
    from_column: &str,
    to_table: &str,
    to_column: &str,
) -> TableRelationship {
    TableRelationship {
        from_table: from_table.to_string(),
        from_column: from_column.to_string(),
        to_table: to_table.to_string(),
        to_column: to_column.to_string(),
        cardinality: Cardinality::ManyToOne,
        active: true,
    }
}

/// A retail star schema: a Sales fact table with Product, Customer, Store
/// and Date dimensions.
pub fn create_sample_retail_context() -> SchemaContext {
    SchemaContext {
        tables: vec![
            TableMapping {
                dax_name: "Sales".to_string(),
                sql_name: "sales".to_string(),
                columns: vec![
                    column("OrderId", "order_id", "NUMBER"),
                    column("Amount", "amount", "NUMBER(18,2)"),
                    column("Cost", "cost", "NUMBER(18,2)"),
                    column("Quantity", "quantity", "NUMBER"),
                    column("ProductKey", "product_key", "NUMBER"),
                    column("CustomerKey", "customer_key", "NUMBER"),
                    column("StoreKey", "store_key", "NUMBER"),
                    column("OrderDate", "order_date", "DATE"),
                ],
                primary_key: Some("OrderId".to_string()),
            },
            TableMapping {
                dax_name: "Product".to_string(),
                sql_name: "product".to_string(),
                columns: vec![
                    column("ProductKey", "product_key", "NUMBER"),
                    column("ProductName", "product_name", "VARCHAR"),
                    column("Category", "category", "VARCHAR"),
                    column("ListPrice", "list_price", "NUMBER(18,2)"),
                ],
                primary_key: Some("ProductKey".to_string()),
            },
            TableMapping {
                dax_name: "Customer".to_string(),
                sql_name: "customer".to_string(),
                columns: vec![
                    column("CustomerKey", "customer_key", "NUMBER"),
                    column("CustomerName", "customer_name", "VARCHAR"),
                    column("Email", "email", "VARCHAR"),
                    column("Region", "region", "VARCHAR"),
                ],
                primary_key: Some("CustomerKey".to_string()),
            },
            TableMapping {
                dax_name: "Store".to_string(),
                sql_name: "store".to_string(),
                columns: vec![
                    column("StoreKey", "store_key", "NUMBER"),
                    column("StoreName", "store_name", "VARCHAR"),
                    column("City", "city", "VARCHAR"),
                ],
                primary_key: Some("StoreKey".to_string()),
            },
            TableMapping {
                dax_name: "Date".to_string(),
                sql_name: "date_dim".to_string(),
                columns: vec![
                    column("Date", "date_value", "DATE"),
                    column("Year", "year_num", "NUMBER"),
                    column("Month", "month_num", "NUMBER"),
                ],
                primary_key: Some("Date".to_string()),
            },
        ],
        relationships: vec![
            many_to_one("Sales", "ProductKey", "Product", "ProductKey"),
            many_to_one("Sales", "CustomerKey", "Customer", "CustomerKey"),
            many_to_one("Sales", "StoreKey", "Store", "StoreKey"),
            many_to_one("Sales", "OrderDate", "Date", "Date"),
        ],
    }
}
