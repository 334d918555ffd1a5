//! Raw record shapes for the two SECOP data sources.
//!
//! The signed-contracts dataset and the procurement-processes dataset
//! carry different column names for the same concepts. Each raw shape
//! gets its own explicit mapping onto [`ContractRecord`]; analysis
//! never touches source-specific field names.

use crate::models::ContractRecord;
use serde::Deserialize;
use serde_json::Value;

/// Supplier label for processes that have no awarded supplier yet.
pub const SIN_ADJUDICAR: &str = "Sin adjudicar";

/// A signed contract as returned by the contracts endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignedContract {
    pub id_contrato: Option<String>,
    #[serde(alias = "referencia_del_contrato")]
    pub referencia_contrato: Option<String>,
    #[serde(alias = "proceso_de_compra")]
    pub referencia_proceso: Option<String>,
    #[serde(alias = "nit_de_la_entidad")]
    pub nit_entidad: Option<String>,
    #[serde(alias = "documento_proveedor")]
    pub documento_proveedor: Option<String>,
    #[serde(alias = "fecha_de_firma")]
    pub fecha_firma: Option<String>,
    #[serde(alias = "fecha_de_inicio_del_contrato", alias = "fecha_de_inicio_de_ejecucion")]
    pub fecha_inicio: Option<String>,
    #[serde(alias = "fecha_de_fin_del_contrato", alias = "fecha_de_fin_de_ejecucion")]
    pub fecha_fin: Option<String>,
    pub estado_contrato: Option<String>,
    #[serde(alias = "valor_del_contrato")]
    pub valor_contrato: Value,
    pub valor_pagado: Value,
    #[serde(alias = "valor_pendiente_de_pago")]
    pub valor_pendiente: Value,
    #[serde(alias = "modalidad_de_contratacion")]
    pub modalidad_contratacion: Option<String>,
    #[serde(alias = "tipo_de_contrato")]
    pub tipo_contrato: Option<String>,
    pub proveedor_adjudicado: Option<String>,
    #[serde(alias = "objeto_del_contrato")]
    pub objeto_contrato: Option<String>,
    #[serde(alias = "descripcion_del_proceso")]
    pub descripcion_proceso: Option<String>,
    pub es_pyme: Option<String>,
    #[serde(alias = "nombre_supervisor")]
    pub nombre_supervisor: Option<String>,
    #[serde(alias = "liquidaci_n")]
    pub liquidacion: Option<String>,
    #[serde(alias = "ultima_actualizacion")]
    pub ultima_actualizacion: Option<String>,
}

impl SignedContract {
    /// Maps the signed-contract shape onto the canonical record.
    pub fn into_contract(self) -> ContractRecord {
        ContractRecord {
            id_contrato: self.id_contrato,
            referencia_contrato: self.referencia_contrato,
            referencia_proceso: self.referencia_proceso,
            nit_entidad: self.nit_entidad,
            documento_proveedor: self.documento_proveedor,
            fecha_firma: self.fecha_firma,
            fecha_inicio: self.fecha_inicio,
            fecha_fin: self.fecha_fin,
            estado_contrato: self.estado_contrato,
            valor_contrato: self.valor_contrato,
            valor_pagado: self.valor_pagado,
            valor_pendiente: self.valor_pendiente,
            modalidad_contratacion: self.modalidad_contratacion,
            tipo_contrato: self.tipo_contrato,
            proveedor_adjudicado: self.proveedor_adjudicado,
            objeto_contrato: self.objeto_contrato,
            descripcion_proceso: self.descripcion_proceso,
            es_pyme: self.es_pyme,
            nombre_supervisor: self.nombre_supervisor,
            liquidacion: self.liquidacion,
            ultima_actualizacion: self.ultima_actualizacion,
        }
    }
}

/// An in-flight procurement process as returned by the processes
/// endpoint. No contract is signed yet, so there is no contract id and
/// usually no awarded supplier.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProcurementProcess {
    #[serde(alias = "referencia_del_proceso", alias = "id_del_proceso")]
    pub referencia_proceso: Option<String>,
    #[serde(alias = "nit_de_la_entidad", alias = "nit_entidad")]
    pub nit_entidad: Option<String>,
    #[serde(alias = "documento_proveedor")]
    pub documento_proveedor: Option<String>,
    #[serde(alias = "descripcion_del_procedimiento")]
    pub descripcion_procedimiento: Option<String>,
    #[serde(alias = "precio_base")]
    pub precio_base: Value,
    #[serde(alias = "estado_del_procedimiento")]
    pub estado_procedimiento: Option<String>,
    #[serde(alias = "nombre_del_proveedor", alias = "proveedor_seleccionado")]
    pub nombre_proveedor: Option<String>,
    #[serde(alias = "modalidad_de_contratacion")]
    pub modalidad_contratacion: Option<String>,
    #[serde(alias = "tipo_de_contrato")]
    pub tipo_contrato: Option<String>,
    #[serde(alias = "fecha_de_publicacion")]
    pub fecha_publicacion: Option<String>,
    #[serde(alias = "fecha_de_ultima_publicaci")]
    pub ultima_actualizacion: Option<String>,
}

impl ProcurementProcess {
    /// Maps the procurement-process shape onto the canonical record.
    ///
    /// The process reference doubles as the contract-reference fallback
    /// so the dedup composite key lines up with the signed version of
    /// the same contract. A process without a proposed supplier gets
    /// the literal "Sin adjudicar".
    pub fn into_contract(self) -> ContractRecord {
        let proveedor = self
            .nombre_proveedor
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| SIN_ADJUDICAR.to_string());

        ContractRecord {
            id_contrato: None,
            referencia_contrato: self.referencia_proceso.clone(),
            referencia_proceso: self.referencia_proceso,
            nit_entidad: self.nit_entidad,
            documento_proveedor: self.documento_proveedor,
            fecha_firma: None,
            fecha_inicio: None,
            fecha_fin: None,
            estado_contrato: self.estado_procedimiento,
            valor_contrato: self.precio_base,
            valor_pagado: Value::Null,
            valor_pendiente: Value::Null,
            modalidad_contratacion: self.modalidad_contratacion,
            tipo_contrato: self.tipo_contrato,
            proveedor_adjudicado: Some(proveedor),
            objeto_contrato: self.descripcion_procedimiento.clone(),
            descripcion_proceso: self.descripcion_procedimiento,
            es_pyme: None,
            nombre_supervisor: None,
            liquidacion: None,
            ultima_actualizacion: self.ultima_actualizacion,
        }
    }
}
