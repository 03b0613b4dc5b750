//! Errores del cliente
//!
//! Cada código de estado se traduce a un mensaje en portugués según la
//! operación, con un "Tente novamente" genérico para el resto.

use thiserror::Error;
use validator::ValidationErrors;

/// Operación del cliente, para elegir el mensaje a mostrar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Login,
    Register,
    Profile,
    ListVehicles,
    GetVehicle,
    CreateVehicle,
    UpdateVehicle,
    DeleteVehicle,
    AddPhoto,
    ListPhotos,
    RemovePhoto,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{message}")]
    Api {
        operation: Operation,
        status: u16,
        message: String,
    },

    #[error("Dados inválidos fornecidos.")]
    InvalidInput(#[from] ValidationErrors),

    #[error("Erro de conexão com o servidor. Tente novamente.")]
    Network(#[from] reqwest::Error),

    #[error("Resposta inesperada do servidor: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn from_status(operation: Operation, status: u16) -> Self {
        ClientError::Api {
            operation,
            status,
            message: localized_message(operation, status),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

/// Mensaje para el usuario según operación y código HTTP
pub fn localized_message(operation: Operation, status: u16) -> String {
    use Operation::*;

    let message = match (status, operation) {
        (401, Login) => "Email ou senha incorretos",
        (401, _) => "Não autorizado. Faça login novamente.",

        (403, ListVehicles) => "Acesso negado. Você não tem permissão para ver os veículos.",
        (403, CreateVehicle) => "Acesso negado. Apenas administradores podem criar veículos.",
        (403, UpdateVehicle) => "Acesso negado. Apenas administradores podem atualizar veículos.",
        (403, DeleteVehicle) => "Acesso negado. Apenas administradores podem deletar veículos.",
        (403, AddPhoto) => "Acesso negado. Apenas administradores podem adicionar fotos.",
        (403, RemovePhoto) => "Acesso negado. Apenas administradores podem remover fotos.",
        (403, _) => "Acesso negado.",

        (404, RemovePhoto) => "Foto não encontrada.",
        (404, GetVehicle | UpdateVehicle | DeleteVehicle | AddPhoto | ListPhotos) => {
            "Veículo não encontrado."
        }

        (400, Login) => "Dados inválidos fornecidos",
        (400, _) => "Dados inválidos fornecidos.",

        (409, Register) => "Email já está em uso.",
        (409, DeleteVehicle) => "Veículo possui vendas registradas e não pode ser removido.",

        (429, _) => "Muitas requisições. Aguarde e tente novamente.",

        (_, Login | ListVehicles) => "Erro interno do servidor. Tente novamente.",
        (_, Register) => "Erro ao registrar usuário. Tente novamente.",
        (_, Profile) => "Erro ao carregar perfil. Tente novamente.",
        (_, GetVehicle) => "Erro ao carregar veículo. Tente novamente.",
        (_, CreateVehicle) => "Erro ao criar veículo. Tente novamente.",
        (_, UpdateVehicle) => "Erro ao atualizar veículo. Tente novamente.",
        (_, DeleteVehicle) => "Erro ao deletar veículo. Tente novamente.",
        (_, AddPhoto) => "Erro ao adicionar foto. Tente novamente.",
        (_, ListPhotos) => "Erro ao carregar fotos. Tente novamente.",
        (_, RemovePhoto) => "Erro ao remover foto. Tente novamente.",
    };
    message.to_string()
}
