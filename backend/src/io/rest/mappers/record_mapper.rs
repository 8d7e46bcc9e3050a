//! Conversion from generic stored rows to the typed DTOs in `shared`.

use shared::{Employee, Lot, Product, Purchase, QualityControl};

use crate::domain::errors::RecordResult;
use crate::domain::models::Record;

/// Build a DTO from a row read back from the store
pub trait FromRecord: Sized {
    fn from_record(record: &Record) -> RecordResult<Self>;
}

pub struct RecordMapper;

impl RecordMapper {
    pub fn to_dto<T: FromRecord>(record: &Record) -> RecordResult<T> {
        T::from_record(record)
    }

    pub fn to_dto_list<T: FromRecord>(records: &[Record]) -> RecordResult<Vec<T>> {
        records.iter().map(T::from_record).collect()
    }
}

impl FromRecord for Purchase {
    fn from_record(record: &Record) -> RecordResult<Self> {
        Ok(Purchase {
            id: record.id,
            date: record.text("fecha")?,
            supplier: record.text("proveedor")?,
            amount: record.decimal("monto")?,
            product_identifier: record.text("identificador_producto")?,
            customer: record.text("cliente")?,
        })
    }
}

impl FromRecord for Employee {
    fn from_record(record: &Record) -> RecordResult<Self> {
        Ok(Employee {
            id: record.id,
            name: record.text("nombre")?,
            role: record.text("puesto")?,
            hire_date: record.text("fecha_ingreso")?,
            salary: record.decimal("sueldo")?,
            branch: record.text("sucursal")?,
            email: record.text("contacto_mail")?,
            phone: record.text("celular")?,
            termination_date: record.optional_text("fecha_de_baja")?.unwrap_or_default(),
        })
    }
}

impl FromRecord for Product {
    fn from_record(record: &Record) -> RecordResult<Self> {
        Ok(Product {
            id: record.id,
            name: record.text("nombre")?,
            sku: record.text("sku")?,
        })
    }
}

impl FromRecord for Lot {
    fn from_record(record: &Record) -> RecordResult<Self> {
        Ok(Lot {
            id: record.id,
            product_sku: record.text("producto_sku")?,
            product_name: record.optional_text("producto_nombre")?,
            quantity: record.integer("cantidad")?,
            created_at: record.text("fecha_creacion")?,
        })
    }
}

impl FromRecord for QualityControl {
    fn from_record(record: &Record) -> RecordResult<Self> {
        Ok(QualityControl {
            id: record.id,
            lot_id: record.integer("lote_id")?,
            parameter: record.text("parametro")?,
            value: record.decimal("valor")?,
            approved: record.flag("aprobado")?,
            timestamp: record.text("timestamp")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::RecordError;
    use crate::domain::models::FieldValue;

    fn text(value: &str) -> FieldValue {
        FieldValue::Text(value.to_string())
    }

    #[test]
    fn test_lot_without_joined_name() {
        let record = Record::new(9)
            .with("producto_sku", text("AB1"))
            .with("cantidad", FieldValue::Integer(50))
            .with("fecha_creacion", text("2025-02-10 14:03:12"));

        let lot: Lot = RecordMapper::to_dto(&record).unwrap();

        assert_eq!(lot.id, 9);
        assert_eq!(lot.product_name, None);
        assert_eq!(lot.quantity, 50);
    }

    #[test]
    fn test_quality_control_mapping() {
        let record = Record::new(2)
            .with("lote_id", FieldValue::Integer(9))
            .with("parametro", text("weight"))
            .with("valor", FieldValue::Decimal(12.5))
            .with("aprobado", FieldValue::Flag(true))
            .with("timestamp", text("2025-02-10 15:00:00"));

        let control: QualityControl = RecordMapper::to_dto(&record).unwrap();

        assert_eq!(control.lot_id, 9);
        assert!(control.approved);
        assert_eq!(control.verdict(), "APPROVED");
    }

    #[test]
    fn test_missing_column_is_store_error() {
        let record = Record::new(1).with("nombre", text("Gorra"));

        let result: RecordResult<Vec<Product>> = RecordMapper::to_dto_list(&[record]);
        assert!(matches!(result, Err(RecordError::Store(_))));
    }
}
